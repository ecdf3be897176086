use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::game::cards::UnoCard;
use crate::game::events::GameEvent;
use crate::game::sequencer::{Event, Table};
use crate::game::state::Side;

/// Where a card was when its current motion began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    DrawPile,
    Hand(Side),
}

#[derive(Debug, Clone, Copy)]
pub struct Motion {
    pub from: Place,
    pub started: Instant,
    pub duration: Duration,
}

/// A card plus what a renderer needs to animate it.
#[derive(Debug, Clone)]
pub struct CardView {
    /// `None` while the card is hidden from this side.
    pub card: Option<UnoCard>,
    pub face_up: bool,
    pub highlighted: bool,
    pub motion: Option<Motion>,
}

impl CardView {
    pub fn new(card: Option<UnoCard>, face_up: bool) -> CardView {
        CardView {
            card,
            face_up,
            highlighted: false,
            motion: None,
        }
    }

    pub fn start_animating(&mut self, from: Place, now: Instant, duration: Duration) {
        self.motion = Some(Motion {
            from,
            started: now,
            duration,
        });
    }

    pub fn settled(&self, now: Instant) -> bool {
        match self.motion {
            Some(m) => now >= m.started + m.duration,
            None => true,
        }
    }

    /// Fraction of the current motion completed, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        match self.motion {
            Some(m) if !m.duration.is_zero() => {
                let elapsed = now.saturating_duration_since(m.started);
                (elapsed.as_secs_f32() / m.duration.as_secs_f32()).min(1.0)
            }
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<CardView>,
    pub is_turn: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Hand::default()
    }

    /// Appends a card and returns its index.
    pub fn push_card(&mut self, view: CardView) -> usize {
        self.cards.push(view);
        self.cards.len() - 1
    }

    pub fn remove_card(&mut self, card_idx: usize) -> Option<CardView> {
        if card_idx >= self.cards.len() {
            return None;
        }
        Some(self.cards.remove(card_idx))
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn get(&self, idx: usize) -> Option<&CardView> {
        self.cards.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CardView> {
        self.cards.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The hand's cards if every one of them is known.
    pub fn known_cards(&self) -> Option<Vec<UnoCard>> {
        self.cards.iter().map(|v| v.card).collect()
    }

    pub fn start_turn(&mut self) {
        self.is_turn = true;
    }

    pub fn end_turn(&mut self) {
        self.is_turn = false;
        for view in &mut self.cards {
            view.highlighted = false;
        }
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.is_turn = false;
    }

    /// Sorts known cards by order code and turns them face up. Hands with
    /// hidden cards stay as they are until the owner reveals them.
    pub fn sort_for_reveal(&mut self, side: Side, now: Instant, duration: Duration) -> bool {
        let Some(mut cards) = self.known_cards() else {
            return false;
        };
        cards.sort();
        for (view, card) in self.cards.iter_mut().zip(cards) {
            view.card = Some(card);
            view.face_up = true;
            view.start_animating(Place::Hand(side), now, duration);
        }
        true
    }

    pub fn score(&self) -> i32 {
        self.cards.iter().filter_map(|v| v.card).map(|c| c.get_value()).sum()
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<5} | {:<15}", "Index", "Card")?;
        for (idx, view) in self.cards.iter().enumerate() {
            match view.card {
                Some(card) => writeln!(f, "{:>5} | {:<15}", idx, card)?,
                None => writeln!(f, "{:>5} | {:<15}", idx, "(hidden)")?,
            }
        }
        Ok(())
    }
}

/// Reacts to a hand's lifecycle by queueing further events.
pub trait HandController {
    fn on_turn_start(&mut self, _table: &mut Table<'_>, _opponent_size: usize) {}

    fn on_add_card(&mut self, _table: &mut Table<'_>, _index: usize) {}

    fn on_remove_card(&mut self, _index: usize) {}

    fn on_reset(&mut self) {}
}

/// The human side: a display order sorted by order code and the
/// play-or-keep choice after a voluntary draw.
#[derive(Debug, Default)]
pub struct LocalPlayer {
    sorted: Vec<usize>,
    drawn_playable: Option<usize>,
}

impl LocalPlayer {
    pub fn new() -> LocalPlayer {
        LocalPlayer::default()
    }

    /// Hand indices in display order.
    pub fn display_order(&self) -> &[usize] {
        &self.sorted
    }

    /// Index of a freshly drawn card waiting for a play-or-keep answer.
    pub fn drawn_playable(&self) -> Option<usize> {
        self.drawn_playable
    }

    fn insert_sorted(&mut self, table: &Table<'_>, index: usize) {
        let order = |i: usize| {
            table
                .state
                .player
                .get(i)
                .and_then(|v| v.card)
                .map(|c| c.order_code())
                .unwrap_or(u8::MAX)
        };
        let code = order(index);
        let pos = self
            .sorted
            .iter()
            .position(|&i| code < order(i))
            .unwrap_or(self.sorted.len());
        self.sorted.insert(pos, index);
    }
}

impl HandController for LocalPlayer {
    fn on_turn_start(&mut self, _table: &mut Table<'_>, _opponent_size: usize) {
        self.drawn_playable = None;
    }

    fn on_add_card(&mut self, table: &mut Table<'_>, index: usize) {
        self.insert_sorted(table, index);
        let state = &mut *table.state;
        if !(state.player.is_turn && state.turn == Side::Player && state.has_drawn) {
            return;
        }
        let top = state.top_card();
        let playable = match (state.player.get(index).and_then(|v| v.card), top) {
            (Some(card), Some(top)) => card.can_play_on(&top),
            _ => false,
        };
        if playable {
            if let Some(view) = state.player.get_mut(index) {
                view.highlighted = true;
            }
            self.drawn_playable = Some(index);
            table.publish(GameEvent::DrawnCardPlayable { index });
        } else {
            table.push(Event::FinishTurn { early: true });
        }
    }

    fn on_remove_card(&mut self, index: usize) {
        self.sorted.retain(|&i| i != index);
        for i in &mut self.sorted {
            if *i > index {
                *i -= 1;
            }
        }
        self.drawn_playable = None;
    }

    fn on_reset(&mut self) {
        self.sorted.clear();
        self.drawn_playable = None;
    }
}
