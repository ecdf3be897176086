use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::error::UnoError;
use crate::game::cards::{decode_cards, encode_cards, UnoCard, CARDS_PER_DECK};
use crate::game::deck::{Dealer, Round, CARDS_PER_HAND, INITIAL_DECK_COUNT};
use crate::game::hand::HandController;
use crate::game::opponent::Opponent;
use crate::game::save::derive_draw_count;
use crate::game::sequencer::Table;
use crate::game::state::{GameState, RoundSnapshot, Side};
use crate::protocol::link::PeerLink;

enum Role {
    /// Holds the deck, deals, and saves.
    Server { dealer: Dealer, rng: StdRng },
    /// Mirrors the server's deck as a count.
    Client { card_count: usize },
}

/// A human opponent on the other end of a [`PeerLink`].
pub struct RemoteOpponent {
    link: PeerLink,
    role: Role,
}

impl RemoteOpponent {
    pub fn server(link: PeerLink, dealer: Dealer, rng: StdRng) -> RemoteOpponent {
        link.enable("reset");
        RemoteOpponent {
            link,
            role: Role::Server { dealer, rng },
        }
    }

    pub fn client(link: PeerLink) -> RemoteOpponent {
        for kind in ["reset", "clientCanStart", "start", "card"] {
            link.enable(kind);
        }
        RemoteOpponent {
            link,
            role: Role::Client { card_count: 0 },
        }
    }

    pub fn link(&self) -> &PeerLink {
        &self.link
    }

    fn send_restore(&self, snapshot: &RoundSnapshot) -> Result<(), UnoError> {
        // the peer's hand is our opponent's hand, which the server always knows
        let Some(hand) = snapshot.opponent.iter().copied().collect::<Option<Vec<_>>>() else {
            return Err(UnoError::Desynchronized(
                "cannot export a round with hidden cards".to_string(),
            ));
        };
        let mut contents = format!("restore;{}", snapshot.top.encode());
        if !hand.is_empty() {
            contents.push(' ');
            contents.push_str(&encode_cards(&hand));
        }
        contents.push(';');
        contents.push_str(&snapshot.player.len().to_string());
        if !snapshot.discard.is_empty() {
            contents.push(' ');
            contents.push_str(&encode_cards(&snapshot.discard));
        }
        contents.push_str(&format!(
            ";{};{}",
            flag(!snapshot.player_turn),
            flag(snapshot.has_drawn)
        ));
        self.link.write("start", &contents);
        Ok(())
    }

    /// Parses a `start` message and queues the round it describes.
    fn receive_start(contents: &str, table: &mut Table<'_>) -> Result<usize, UnoError> {
        let malformed = || UnoError::InvalidMessage(format!("start:{}", contents));
        let sections: Vec<&str> = contents.split(';').collect();
        match sections.as_slice() {
            ["new", cards] => {
                let cards = decode_cards(cards)?;
                let (top, hand) = cards.split_first().ok_or_else(malformed)?;
                table.new_game(*top, hand.to_vec(), vec![None; CARDS_PER_HAND]);
                Ok(INITIAL_DECK_COUNT)
            }
            ["restore", cards, pile, turn, has_drawn] => {
                let cards = decode_cards(cards)?;
                let (top, hand) = cards.split_first().ok_or_else(malformed)?;
                let (size, discard) = pile.split_once(' ').unwrap_or((*pile, ""));
                let size = size.parse::<usize>().map_err(|_| malformed())?;
                let discard = decode_cards(discard)?;
                let count = derive_draw_count(discard.len(), hand.len(), size);
                table.restore(RoundSnapshot {
                    top: *top,
                    discard,
                    player: hand.iter().copied().map(Some).collect(),
                    opponent: vec![None; size],
                    player_turn: parse_flag(turn).ok_or_else(malformed)?,
                    has_drawn: parse_flag(has_drawn).ok_or_else(malformed)?,
                });
                Ok(count)
            }
            _ => Err(malformed()),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Mirrors a draw from the server's pile, reshuffling the discard when empty.
fn will_draw(card_count: &mut usize, discard: &mut Vec<UnoCard>) {
    if *card_count == 0 {
        *card_count = discard.len();
        discard.clear();
        if *card_count == 0 {
            *card_count = CARDS_PER_DECK;
        }
        debug!(count = *card_count, "mirrored reshuffle");
    }
    *card_count -= 1;
}

impl HandController for RemoteOpponent {}

impl Opponent for RemoteOpponent {
    fn name(&self) -> &str {
        match self.role {
            Role::Server { .. } => "Guest",
            Role::Client { .. } => "Host",
        }
    }

    fn holds_deck(&self) -> bool {
        matches!(self.role, Role::Server { .. })
    }

    fn player_can_start(&mut self) -> Result<bool, UnoError> {
        match &mut self.role {
            Role::Server { rng, .. } => {
                let server_starts = rng.gen_bool(0.5);
                self.link
                    .write("clientCanStart", if server_starts { "0" } else { "1" });
                Ok(server_starts)
            }
            Role::Client { .. } => Ok(self.link.wait_for("clientCanStart")? == "1"),
        }
    }

    fn start_round(&mut self, table: &mut Table<'_>) -> Result<(), UnoError> {
        if let Role::Server { dealer, .. } = &mut self.role {
            match dealer.start_round() {
                Round::New(deal) => {
                    let mut cards = vec![deal.top];
                    cards.extend_from_slice(&deal.opponent);
                    self.link
                        .write("start", &format!("new;{}", encode_cards(&cards)));
                    let opponent = deal.opponent.into_iter().map(Some).collect();
                    table.new_game(deal.top, deal.player, opponent);
                }
                Round::Restored(save) => {
                    let snapshot = save.into_snapshot();
                    self.send_restore(&snapshot)?;
                    table.restore(snapshot);
                }
            }
            return Ok(());
        }
        let contents = self.link.wait_for("start")?;
        match Self::receive_start(&contents, table) {
            Ok(count) => {
                if let Role::Client { card_count } = &mut self.role {
                    *card_count = count;
                }
                info!(count, "round received from host");
                Ok(())
            }
            Err(e) => Err(self.link.invalid(&e.to_string())),
        }
    }

    fn draw_visible(&mut self, discard: &mut Vec<UnoCard>) -> Result<UnoCard, UnoError> {
        match &mut self.role {
            Role::Server { dealer, .. } => Ok(dealer.draw(discard)),
            Role::Client { card_count } => {
                will_draw(card_count, discard);
                let contents = self.link.wait_for("card")?;
                match UnoCard::decode(&contents) {
                    Ok(card) => Ok(card),
                    Err(e) => Err(self.link.invalid(&e.to_string())),
                }
            }
        }
    }

    fn draw_hidden(&mut self, discard: &mut Vec<UnoCard>) -> Result<Option<UnoCard>, UnoError> {
        match &mut self.role {
            Role::Server { dealer, .. } => {
                let card = dealer.draw(discard);
                self.link.write("card", &card.encode());
                Ok(Some(card))
            }
            Role::Client { card_count } => {
                will_draw(card_count, discard);
                Ok(None)
            }
        }
    }

    fn cards_in_deck(&self) -> usize {
        match &self.role {
            Role::Server { dealer, .. } => dealer.count(),
            Role::Client { card_count } => *card_count,
        }
    }

    fn player_drew(&mut self) {
        self.link.write("drawCard", "");
    }

    fn player_played(&mut self, index: usize, card: UnoCard) {
        self.link
            .write("playCard", &format!("{} {}", index, card.encode()));
    }

    fn player_finished_early(&mut self) {
        self.link.write("finishTurnEarly", "");
    }

    fn reveal(&mut self, cards: &[UnoCard]) {
        if !cards.is_empty() {
            self.link.write("?reveal", &encode_cards(cards));
        }
    }

    fn chat(&mut self, text: &str) {
        self.link.write("?chat", text);
    }

    fn will_reset(&mut self) -> Result<(), UnoError> {
        self.link.write("reset", "");
        self.link.wait_for("reset")?;
        if !self.link.version_established() {
            return Err(self
                .link
                .invalid("Opponent did not send version information before reset."));
        }
        Ok(())
    }

    fn can_save(&mut self, state: &GameState) {
        if let Role::Server { dealer, .. } = &self.role {
            dealer.save(state);
        }
    }

    fn round_over(&mut self, winner: Side) {
        if let Role::Server { dealer, .. } = &self.role {
            debug!(%winner, "discarding save");
            dealer.discard_save();
        }
    }

    fn desync(&mut self, reason: &str) -> UnoError {
        self.link.invalid(reason)
    }

    fn export_round(&mut self, state: &GameState) -> Result<(), UnoError> {
        let Some(snapshot) = state.snapshot() else {
            return Ok(());
        };
        self.link
            .write("clientCanStart", flag(!snapshot.player_turn));
        self.send_restore(&snapshot)
    }

    fn close(&mut self) {
        if self.link.is_open() {
            self.link.write("close", "");
        }
        self.link.close();
    }
}
