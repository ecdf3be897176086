use std::fmt::Display;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::game::cards::{UnoCard, CARDS_PER_DECK};
use crate::game::hand::{CardView, Hand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No opponent yet, or the connection is being re-established.
    Waiting,
    Dealing,
    InProgress,
    RoundOver { winner: Side, until: Instant },
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub top: Option<CardView>,
    /// Cards under the top of the discard pile.
    pub discard: Vec<UnoCard>,
    pub player: Hand,
    pub opponent: Hand,
    pub turn: Side,
    pub has_drawn: bool,
    pub phase: Phase,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            top: None,
            discard: Vec::new(),
            player: Hand::new(),
            opponent: Hand::new(),
            turn: Side::Player,
            has_drawn: false,
            phase: Phase::Waiting,
        }
    }
}

impl GameState {
    pub fn new() -> GameState {
        GameState::default()
    }

    pub fn hand(&self, side: Side) -> &Hand {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn hand_mut(&mut self, side: Side) -> &mut Hand {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn top_card(&self) -> Option<UnoCard> {
        self.top.as_ref().and_then(|v| v.card)
    }

    pub fn is_player_turn(&self) -> bool {
        self.turn == Side::Player && self.phase == Phase::InProgress
    }

    pub fn in_progress(&self) -> bool {
        self.phase == Phase::InProgress
    }

    pub fn clear(&mut self) {
        self.top = None;
        self.discard.clear();
        self.player.clear();
        self.opponent.clear();
        self.has_drawn = false;
    }

    /// Every card on the table given the size of the draw pile. A consistent
    /// round always totals 108.
    pub fn card_total(&self, draw_pile: usize) -> usize {
        draw_pile
            + self.discard.len()
            + self.player.len()
            + self.opponent.len()
            + usize::from(self.top.is_some())
    }

    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        let top = self.top_card()?;
        Some(RoundSnapshot {
            top,
            discard: self.discard.clone(),
            player: self.player.cards().iter().map(|v| v.card).collect(),
            opponent: self.opponent.cards().iter().map(|v| v.card).collect(),
            player_turn: self.turn == Side::Player,
            has_drawn: self.has_drawn,
        })
    }

    pub fn check_total(&self, draw_pile: usize) -> bool {
        let total = self.card_total(draw_pile);
        if total != CARDS_PER_DECK {
            tracing::error!(total, draw_pile, "card total drifted from {}", CARDS_PER_DECK);
            return false;
        }
        true
    }
}

/// A round in progress as seen by one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub top: UnoCard,
    pub discard: Vec<UnoCard>,
    pub player: Vec<Option<UnoCard>>,
    pub opponent: Vec<Option<UnoCard>>,
    pub player_turn: bool,
    pub has_drawn: bool,
}
