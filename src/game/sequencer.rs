use std::collections::VecDeque;
use std::fmt::Display;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::Timing;
use crate::error::UnoError;
use crate::game::cards::{Color, UnoCard};
use crate::game::events::GameEvent;
use crate::game::hand::{CardView, HandController, LocalPlayer, Place};
use crate::game::opponent::Opponent;
use crate::game::state::{GameState, Phase, RoundSnapshot, Side};
use crate::ports::bus::EventBus;

/// A unit of deferred work. Its mutation happens once when it starts; the
/// sequencer then waits for the returned [`Watch`] before starting the next.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Delay(Duration),
    Deal { side: Side, card: Option<UnoCard> },
    Restore(Box<RoundSnapshot>),
    FlipTop(UnoCard),
    BeginTurn,
    Draw { side: Side, voluntary: bool },
    /// Plays from the hand whose turn it is. `color` is applied to wilds.
    Play { index: usize, color: Option<Color> },
    RestartTurn,
    FinishTurn { early: bool },
    GameOver,
    Remote(RemoteMove),
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Delay(d) => write!(f, "delay({})", d.as_millis()),
            Event::Deal { side, .. } => write!(f, "deal({})", side),
            Event::Restore(_) => write!(f, "restore()"),
            Event::FlipTop(card) => write!(f, "flip_top({})", card.encode()),
            Event::BeginTurn => write!(f, "begin_turn()"),
            Event::Draw { side, voluntary } => write!(f, "draw_card({}, {})", side, voluntary),
            Event::Play { index, .. } => write!(f, "play_card({})", index),
            Event::RestartTurn => write!(f, "restart_turn()"),
            Event::FinishTurn { early } => write!(f, "finish_turn({})", early),
            Event::GameOver => write!(f, "game_over()"),
            Event::Remote(mv) => write!(f, "<{:?}>", mv),
        }
    }
}

/// A move announced by the remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteMove {
    DrawCard,
    PlayCard { index: usize, card: UnoCard },
    FinishTurnEarly,
    Reveal(Vec<UnoCard>),
    Chat(String),
    SetName(String),
}

/// What the local player asks for. Indices are hand indices, not display positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Play { index: usize, color: Option<Color> },
    Draw,
    KeepDrawn,
    Chat(String),
}

/// Everything that reaches the sequencer from outside its thread.
#[derive(Debug, Clone)]
pub enum Command {
    Input(Input),
    Remote(RemoteMove),
    Connected { resumed: bool },
    Disconnected,
    Fatal(UnoError),
}

/// What a started event is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Watch {
    Nothing,
    Until(Instant),
    Card(Side, usize),
    Top,
}

/// The view a hand controller gets of the table while an event is starting.
pub struct Table<'a> {
    pub state: &'a mut GameState,
    queue: &'a mut VecDeque<Event>,
    events: &'a mut Vec<GameEvent>,
    timing: &'a Timing,
    now: Instant,
}

impl<'a> Table<'a> {
    pub fn new(
        state: &'a mut GameState,
        queue: &'a mut VecDeque<Event>,
        events: &'a mut Vec<GameEvent>,
        timing: &'a Timing,
        now: Instant,
    ) -> Table<'a> {
        Table {
            state,
            queue,
            events,
            timing,
            now,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    pub fn delay(&mut self, duration: Duration) {
        self.push(Event::Delay(duration));
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn top_card(&self) -> Option<UnoCard> {
        self.state.top_card()
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn timing(&self) -> &Timing {
        self.timing
    }

    /// Deals both hands card by card, opponent first, then flips the top
    /// card and starts the first turn.
    pub fn new_game(&mut self, top: UnoCard, player: Vec<UnoCard>, opponent: Vec<Option<UnoCard>>) {
        for i in 0..player.len().max(opponent.len()) {
            if let Some(card) = opponent.get(i) {
                self.push(Event::Deal {
                    side: Side::Opponent,
                    card: *card,
                });
            }
            if let Some(card) = player.get(i) {
                self.push(Event::Deal {
                    side: Side::Player,
                    card: Some(*card),
                });
            }
        }
        self.push(Event::FlipTop(top));
        self.push(Event::BeginTurn);
    }

    pub fn restore(&mut self, snapshot: RoundSnapshot) {
        self.push(Event::Restore(Box::new(snapshot)));
        self.push(Event::BeginTurn);
    }
}

/// Runs one event at a time against the game state. Thread-confined: the
/// front end calls [`Sequencer::tick`] at a fixed rate and everything else
/// arrives as a [`Command`] on the inbox.
pub struct Sequencer {
    state: GameState,
    queue: VecDeque<Event>,
    /// Peer moves wait here until everything the previous one caused has run.
    remote: VecDeque<RemoteMove>,
    current: Option<Watch>,
    player: LocalPlayer,
    opponent: Box<dyn Opponent>,
    opponent_name: String,
    inbox: flume::Receiver<Command>,
    bus: EventBus,
    outbox: Vec<GameEvent>,
    timing: Timing,
    suspended: bool,
    pending_export: bool,
    fatal: Option<UnoError>,
    started: u64,
}

impl Sequencer {
    pub fn new(
        opponent: Box<dyn Opponent>,
        inbox: flume::Receiver<Command>,
        bus: EventBus,
        timing: Timing,
    ) -> Sequencer {
        let opponent_name = opponent.name().to_string();
        Sequencer {
            state: GameState::new(),
            queue: VecDeque::new(),
            remote: VecDeque::new(),
            current: None,
            player: LocalPlayer::new(),
            opponent,
            opponent_name,
            inbox,
            bus,
            outbox: Vec::new(),
            timing,
            suspended: false,
            pending_export: false,
            fatal: None,
            started: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    pub fn opponent_name(&self) -> &str {
        &self.opponent_name
    }

    pub fn cards_in_deck(&self) -> usize {
        self.opponent.cards_in_deck()
    }

    /// Number of events started since creation.
    pub fn events_started(&self) -> u64 {
        self.started
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty() && self.remote.is_empty()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn fatal(&self) -> Option<&UnoError> {
        self.fatal.as_ref()
    }

    pub fn accepts_input(&self) -> bool {
        !self.suspended
            && !self.pending_export
            && self.fatal.is_none()
            && self.is_idle()
            && self.state.is_player_turn()
            && self.state.player.is_turn
    }

    pub fn can_draw(&self) -> bool {
        self.accepts_input() && !self.state.has_drawn
    }

    /// Whole seconds until the next deal, while a round is over.
    pub fn countdown(&self, now: Instant) -> Option<u64> {
        match self.state.phase {
            Phase::RoundOver { until, .. } => {
                let left = until.saturating_duration_since(now);
                Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
            }
            _ => None,
        }
    }

    /// Appends an event to the queue from outside an event start.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Deals the first round. Network games wait for `Command::Connected` instead.
    pub fn begin(&mut self, now: Instant) -> Result<(), UnoError> {
        let result = self.reset(now);
        self.flush_events();
        result.or_else(|e| self.fail(e))
    }

    pub fn tick(&mut self, now: Instant) -> Result<(), UnoError> {
        if let Some(e) = &self.fatal {
            return Err(e.clone());
        }
        let result = self.step(now);
        self.flush_events();
        result.or_else(|e| self.fail(e))
    }

    pub fn shutdown(&mut self) {
        self.opponent.close();
    }

    fn step(&mut self, now: Instant) -> Result<(), UnoError> {
        if let Phase::RoundOver { until, .. } = self.state.phase {
            if now >= until && !self.suspended {
                self.reset(now)?;
            }
        }
        self.pump(now)?;
        while let Ok(command) = self.inbox.try_recv() {
            self.handle(command, now)?;
        }
        self.pump(now)
    }

    fn fail(&mut self, e: UnoError) -> Result<(), UnoError> {
        self.flush_events();
        if e.is_recoverable() {
            warn!("{}; waiting for the connection to come back", e);
            self.suspend();
            self.flush_events();
            return Ok(());
        }
        error!("{}", e);
        self.bus.publish([GameEvent::Fatal {
            message: e.to_string(),
        }]);
        self.fatal = Some(e.clone());
        Err(e)
    }

    fn suspend(&mut self) {
        if !self.suspended {
            self.outbox.push(GameEvent::Disconnected);
        }
        self.suspended = true;
        self.current = None;
    }

    fn flush_events(&mut self) {
        if !self.outbox.is_empty() {
            let events = std::mem::take(&mut self.outbox);
            self.bus.publish_events(&events);
        }
    }

    fn pump(&mut self, now: Instant) -> Result<(), UnoError> {
        // nothing moves until the peer is back
        if self.suspended {
            return Ok(());
        }
        loop {
            if let Some(watch) = self.current {
                if !self.is_done(watch, now) {
                    return Ok(());
                }
                self.current = None;
            }
            if matches!(self.state.phase, Phase::RoundOver { .. }) {
                return Ok(());
            }
            if self.queue.is_empty() {
                if let Some(mv) = self.remote.pop_front() {
                    self.queue.push_back(Event::Remote(mv));
                } else if self.pending_export {
                    self.pending_export = false;
                    info!("exporting round to the reconnected peer");
                    self.opponent.export_round(&self.state)?;
                }
            }
            let Some(event) = self.queue.pop_front() else {
                return Ok(());
            };
            self.started += 1;
            debug!("{}", event);
            let watch = self.start(event, now)?;
            self.current = Some(watch);
        }
    }

    fn is_done(&self, watch: Watch, now: Instant) -> bool {
        match watch {
            Watch::Nothing => true,
            Watch::Until(t) => now >= t,
            Watch::Card(side, idx) => self
                .state
                .hand(side)
                .get(idx)
                .map_or(true, |v| v.settled(now)),
            Watch::Top => self.state.top.as_ref().map_or(true, |v| v.settled(now)),
        }
    }

    fn reset(&mut self, now: Instant) -> Result<(), UnoError> {
        self.queue.clear();
        self.remote.clear();
        self.current = None;
        self.pending_export = false;
        self.state.phase = Phase::Waiting;
        self.opponent.will_reset()?;

        self.state.clear();
        self.player.on_reset();
        self.opponent.on_reset();
        let player_starts = self.opponent.player_can_start()?;
        self.state.turn = if player_starts {
            Side::Player
        } else {
            Side::Opponent
        };
        self.state.phase = Phase::Dealing;
        self.outbox.push(GameEvent::RoundStarted { player_starts });
        info!(player_starts, "starting a new round");

        let mut table = Table::new(
            &mut self.state,
            &mut self.queue,
            &mut self.outbox,
            &self.timing,
            now,
        );
        self.opponent.start_round(&mut table)
    }

    fn handle(&mut self, command: Command, now: Instant) -> Result<(), UnoError> {
        match command {
            Command::Input(input) => {
                self.handle_input(input);
                Ok(())
            }
            Command::Remote(mv) => self.handle_remote(mv, now),
            Command::Connected { resumed } => {
                info!(resumed, "opponent connected");
                self.suspended = false;
                if resumed {
                    self.outbox.push(GameEvent::Resynchronized);
                }
                if resumed && self.opponent.holds_deck() && self.state.in_progress() {
                    self.opponent.will_reset()?;
                    self.pending_export = true;
                    Ok(())
                } else {
                    self.reset(now)
                }
            }
            Command::Disconnected => {
                self.suspend();
                Ok(())
            }
            Command::Fatal(e) => Err(e),
        }
    }

    fn handle_input(&mut self, input: Input) {
        if let Input::Chat(text) = input {
            self.opponent.chat(&text);
            self.outbox.push(GameEvent::Chat {
                from: Side::Player,
                text,
            });
            return;
        }
        if !self.accepts_input() {
            debug!(?input, "input ignored");
            return;
        }
        match input {
            Input::Play { index, color } => {
                let (Some(card), Some(top)) = (
                    self.state.player.get(index).and_then(|v| v.card),
                    self.state.top_card(),
                ) else {
                    return;
                };
                if !card.can_play_on(&top) {
                    debug!(%card, %top, "card cannot be played");
                    return;
                }
                if self.state.has_drawn && self.player.drawn_playable() != Some(index) {
                    debug!("only the drawn card can be played");
                    return;
                }
                let color = if card.is_wild() {
                    match color.or(card.color()) {
                        Some(c) => Some(c),
                        None => return,
                    }
                } else {
                    None
                };
                self.queue.push_back(Event::Play { index, color });
            }
            Input::Draw => {
                if !self.state.has_drawn {
                    self.queue.push_back(Event::Draw {
                        side: Side::Player,
                        voluntary: true,
                    });
                }
            }
            Input::KeepDrawn => {
                if self.state.has_drawn {
                    self.queue.push_back(Event::FinishTurn { early: true });
                }
            }
            Input::Chat(_) => {}
        }
    }

    fn handle_remote(&mut self, mv: RemoteMove, now: Instant) -> Result<(), UnoError> {
        match mv {
            RemoteMove::DrawCard | RemoteMove::PlayCard { .. } | RemoteMove::FinishTurnEarly => {
                self.remote.push_back(mv);
                Ok(())
            }
            RemoteMove::Reveal(cards) => self.reveal_opponent(cards, now),
            RemoteMove::Chat(text) => {
                self.outbox.push(GameEvent::Chat {
                    from: Side::Opponent,
                    text,
                });
                Ok(())
            }
            RemoteMove::SetName(name) => {
                self.opponent_name = name.clone();
                self.outbox.push(GameEvent::OpponentNamed { name });
                Ok(())
            }
        }
    }

    fn reveal_opponent(&mut self, cards: Vec<UnoCard>, now: Instant) -> Result<(), UnoError> {
        let hand = &self.state.opponent;
        if cards.len() != hand.len() {
            return Err(self
                .opponent
                .desync("Opponent tried to reveal hand of different size."));
        }
        for (view, new) in hand.cards().iter().zip(&cards) {
            if let Some(old) = view.card {
                if !old.can_become(new) {
                    let reason = format!("Opponent tried to reveal {} as {}.", old, new);
                    return Err(self.opponent.desync(&reason));
                }
            }
        }
        for (idx, card) in cards.into_iter().enumerate() {
            if let Some(view) = self.state.opponent.get_mut(idx) {
                view.card = Some(card);
            }
        }
        self.state
            .opponent
            .sort_for_reveal(Side::Opponent, now, self.timing.flip_duration());
        Ok(())
    }

    fn notify_turn_start(&mut self, side: Side, now: Instant) {
        let opponent_size = self.state.hand(side.other()).len();
        let mut table = Table::new(
            &mut self.state,
            &mut self.queue,
            &mut self.outbox,
            &self.timing,
            now,
        );
        match side {
            Side::Player => self.player.on_turn_start(&mut table, opponent_size),
            Side::Opponent => self.opponent.on_turn_start(&mut table, opponent_size),
        }
    }

    fn notify_add_card(&mut self, side: Side, index: usize, now: Instant) {
        let mut table = Table::new(
            &mut self.state,
            &mut self.queue,
            &mut self.outbox,
            &self.timing,
            now,
        );
        match side {
            Side::Player => self.player.on_add_card(&mut table, index),
            Side::Opponent => self.opponent.on_add_card(&mut table, index),
        }
    }

    fn notify_remove_card(&mut self, side: Side, index: usize) {
        match side {
            Side::Player => self.player.on_remove_card(index),
            Side::Opponent => self.opponent.on_remove_card(index),
        }
    }

    fn begin_turn(&mut self, side: Side, now: Instant) {
        self.state.hand_mut(side).start_turn();
        if side == Side::Player {
            self.opponent.can_save(&self.state);
        }
        self.outbox.push(GameEvent::TurnStarted { side });
        self.notify_turn_start(side, now);
    }

    fn add_card(&mut self, side: Side, card: Option<UnoCard>, now: Instant) -> usize {
        let mut view = CardView::new(card, side == Side::Player);
        view.start_animating(Place::DrawPile, now, self.timing.move_duration());
        self.state.hand_mut(side).push_card(view)
    }

    fn set_top(&mut self, card: UnoCard, from: Place, now: Instant) {
        if let Some(old) = self.state.top.take() {
            if let Some(old) = old.card {
                self.state.discard.push(old);
            }
        }
        let mut view = CardView::new(Some(card), true);
        let duration = match from {
            Place::DrawPile => self.timing.flip_duration(),
            _ => self.timing.move_duration(),
        };
        view.start_animating(from, now, duration);
        self.state.top = Some(view);
        self.outbox.push(GameEvent::TopCardChanged { top_card: card });
    }

    fn start(&mut self, event: Event, now: Instant) -> Result<Watch, UnoError> {
        match event {
            Event::Delay(d) => Ok(Watch::Until(now + d)),
            Event::Deal { side, card } => {
                let idx = self.add_card(side, card, now);
                self.outbox.push(GameEvent::CardDealt { side });
                self.notify_add_card(side, idx, now);
                Ok(Watch::Card(side, idx))
            }
            Event::Restore(snapshot) => {
                self.apply_snapshot(*snapshot, now);
                Ok(Watch::Top)
            }
            Event::FlipTop(card) => {
                self.set_top(card, Place::DrawPile, now);
                Ok(Watch::Top)
            }
            Event::BeginTurn => {
                self.state.phase = Phase::InProgress;
                debug!("player hand\n{}", self.state.player);
                self.begin_turn(self.state.turn, now);
                Ok(Watch::Nothing)
            }
            Event::Draw { side, voluntary } => {
                if voluntary {
                    self.state.has_drawn = true;
                    if side == Side::Player {
                        self.opponent.player_drew();
                    }
                }
                let card = match side {
                    Side::Player => Some(self.opponent.draw_visible(&mut self.state.discard)?),
                    Side::Opponent => self.opponent.draw_hidden(&mut self.state.discard)?,
                };
                let idx = self.add_card(side, card, now);
                self.outbox.push(GameEvent::CardDrawn {
                    side,
                    card: if side == Side::Player { card } else { None },
                });
                self.notify_add_card(side, idx, now);
                Ok(Watch::Card(side, idx))
            }
            Event::Play { index, color } => self.play_card(index, color, now),
            Event::RestartTurn => {
                let side = self.state.turn;
                self.state.hand_mut(side).end_turn();
                self.state.has_drawn = false;
                self.begin_turn(side, now);
                Ok(Watch::Nothing)
            }
            Event::FinishTurn { early } => {
                let ending = self.state.turn;
                if early && ending == Side::Player {
                    self.opponent.player_finished_early();
                }
                self.state.hand_mut(ending).end_turn();
                self.outbox.push(GameEvent::TurnFinished {
                    side: ending,
                    early,
                });
                self.state.turn = ending.other();
                self.state.has_drawn = false;
                self.begin_turn(ending.other(), now);
                Ok(Watch::Nothing)
            }
            Event::GameOver => {
                self.game_over(now);
                Ok(Watch::Nothing)
            }
            Event::Remote(mv) => self.start_remote(mv),
        }
    }

    fn play_card(&mut self, index: usize, color: Option<Color>, now: Instant) -> Result<Watch, UnoError> {
        let side = self.state.turn;
        let Some(view) = self.state.hand_mut(side).remove_card(index) else {
            return Err(UnoError::Desynchronized(format!(
                "{} has no card at index {}",
                side, index
            )));
        };
        let Some(mut card) = view.card else {
            return Err(UnoError::Desynchronized(format!(
                "{} played a hidden card",
                side
            )));
        };
        if let Some(c) = color {
            card.set_color(c);
        }
        if card.color().is_none() {
            return Err(UnoError::Desynchronized(format!(
                "{} played {} without choosing a color",
                side, card
            )));
        }
        if side == Side::Player {
            self.opponent.player_played(index, card);
        }
        self.notify_remove_card(side, index);
        self.set_top(card, Place::Hand(side), now);
        self.outbox.push(GameEvent::CardPlayed { side, card });

        if self.state.hand(side).is_empty() {
            self.queue.push_back(Event::GameOver);
        } else if card.is_skip() {
            for _ in 0..card.card_draws() {
                self.queue.push_back(Event::Draw {
                    side: side.other(),
                    voluntary: false,
                });
            }
            self.queue.push_back(Event::RestartTurn);
        } else {
            self.queue.push_back(Event::FinishTurn { early: false });
        }
        Ok(Watch::Top)
    }

    fn apply_snapshot(&mut self, snapshot: RoundSnapshot, now: Instant) {
        self.state.clear();
        self.state.discard = snapshot.discard;
        self.set_top(snapshot.top, Place::DrawPile, now);
        for card in snapshot.player {
            let idx = self.add_card(Side::Player, card, now);
            self.notify_add_card(Side::Player, idx, now);
        }
        for card in snapshot.opponent {
            self.add_card(Side::Opponent, card, now);
        }
        self.state.turn = if snapshot.player_turn {
            Side::Player
        } else {
            Side::Opponent
        };
        self.state.has_drawn = snapshot.has_drawn;
        info!(
            player = self.state.player.len(),
            opponent = self.state.opponent.len(),
            "restored round"
        );
    }

    fn game_over(&mut self, now: Instant) {
        let winner = self.state.turn;
        self.state.phase = Phase::RoundOver {
            winner,
            until: now + self.timing.game_over(),
        };
        self.state.player.end_turn();
        self.state.opponent.end_turn();
        if winner == Side::Opponent {
            let cards = self.state.player.known_cards().unwrap_or_default();
            self.opponent.reveal(&cards);
        }
        self.state
            .opponent
            .sort_for_reveal(Side::Opponent, now, self.timing.flip_duration());
        let score = self.state.hand(winner.other()).score();
        self.opponent.round_over(winner);
        info!(%winner, score, "round over");
        self.outbox.push(GameEvent::GameOver { winner, score });
    }

    fn require_turn(&mut self) -> Result<(), UnoError> {
        if self.state.turn == Side::Opponent && self.state.in_progress() && self.state.opponent.is_turn {
            Ok(())
        } else {
            Err(self.opponent.desync("Opponent moved out of turn."))
        }
    }

    fn start_remote(&mut self, mv: RemoteMove) -> Result<Watch, UnoError> {
        match mv {
            RemoteMove::DrawCard => {
                self.require_turn()?;
                if self.state.has_drawn {
                    return Err(self.opponent.desync("Opponent tried to draw a second card."));
                }
                self.queue.push_back(Event::Draw {
                    side: Side::Opponent,
                    voluntary: true,
                });
            }
            RemoteMove::PlayCard { index, card } => {
                self.require_turn()?;
                if index >= self.state.opponent.len() {
                    return Err(self
                        .opponent
                        .desync("Opponent believes their hand is a different size."));
                }
                if let Some(old) = self.state.opponent.get(index).and_then(|v| v.card) {
                    if !old.can_become(&card) {
                        let reason = format!("Opponent tried to play {} as {}.", old, card);
                        return Err(self.opponent.desync(&reason));
                    }
                }
                let playable = match self.state.top_card() {
                    Some(top) => card.color().is_some() && card.can_play_on(&top),
                    None => false,
                };
                if !playable {
                    let reason = format!("Opponent cannot play {} now.", card);
                    return Err(self.opponent.desync(&reason));
                }
                if let Some(view) = self.state.opponent.get_mut(index) {
                    view.card = Some(card);
                    view.face_up = true;
                }
                self.queue.push_back(Event::Play { index, color: None });
            }
            RemoteMove::FinishTurnEarly => {
                self.require_turn()?;
                if !self.state.has_drawn {
                    return Err(self
                        .opponent
                        .desync("Opponent tried to end turn without drawing a card."));
                }
                self.queue.push_back(Event::FinishTurn { early: true });
            }
            RemoteMove::Reveal(_) | RemoteMove::Chat(_) | RemoteMove::SetName(_) => {
                warn!(?mv, "remote move queued instead of handled on arrival");
            }
        }
        Ok(Watch::Nothing)
    }
}
