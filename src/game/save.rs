use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SaveError;
use crate::game::cards::{decode_cards, encode_cards, UnoCard, CARDS_PER_DECK};
use crate::game::state::{GameState, RoundSnapshot, Side};

/// A saved round from the deck holder's point of view, stored as seven lines:
/// draw pile, top of discard, discard pile, local hand, opponent hand,
/// turn flag (`1` = local player) and has-drawn flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveGame {
    pub draw_pile: Vec<UnoCard>,
    pub top: UnoCard,
    pub discard: Vec<UnoCard>,
    pub player: Vec<UnoCard>,
    pub opponent: Vec<UnoCard>,
    pub player_turn: bool,
    pub has_drawn: bool,
}

impl SaveGame {
    /// `None` when the state has no top card or holds hidden cards.
    pub fn capture(draw_pile: &[UnoCard], state: &GameState) -> Option<SaveGame> {
        Some(SaveGame {
            draw_pile: draw_pile.to_vec(),
            top: state.top_card()?,
            discard: state.discard.clone(),
            player: state.player.known_cards()?,
            opponent: state.opponent.known_cards()?,
            player_turn: state.turn == Side::Player,
            has_drawn: state.has_drawn,
        })
    }

    pub fn total_cards(&self) -> usize {
        self.draw_pile.len() + 1 + self.discard.len() + self.player.len() + self.opponent.len()
    }

    pub fn to_lines(&self) -> Vec<String> {
        vec![
            encode_cards(&self.draw_pile),
            self.top.encode(),
            encode_cards(&self.discard),
            encode_cards(&self.player),
            encode_cards(&self.opponent),
            flag(self.player_turn),
            flag(self.has_drawn),
        ]
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<SaveGame, SaveError> {
        let line = |i: usize| {
            lines
                .get(i)
                .map(|l| l.as_ref().trim())
                .ok_or(SaveError::MissingLine(i + 1))
        };
        let save = SaveGame {
            draw_pile: decode_cards(line(0)?)?,
            top: UnoCard::decode(line(1)?)?,
            discard: decode_cards(line(2)?)?,
            player: decode_cards(line(3)?)?,
            opponent: decode_cards(line(4)?)?,
            player_turn: parse_flag(line(5)?)?,
            // older saves stop after the turn flag
            has_drawn: match lines.get(6) {
                Some(l) => parse_flag(l.as_ref().trim())?,
                None => false,
            },
        };
        if save.total_cards() != CARDS_PER_DECK {
            return Err(SaveError::CardCount(save.total_cards()));
        }
        Ok(save)
    }

    pub fn into_snapshot(self) -> RoundSnapshot {
        RoundSnapshot {
            top: self.top,
            discard: self.discard,
            player: self.player.into_iter().map(Some).collect(),
            opponent: self.opponent.into_iter().map(Some).collect(),
            player_turn: self.player_turn,
            has_drawn: self.has_drawn,
        }
    }
}

fn flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

fn parse_flag(s: &str) -> Result<bool, SaveError> {
    match s {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(SaveError::BadFlag(other.to_string())),
    }
}

/// Size of the draw pile as seen by a peer without the physical deck.
pub fn derive_draw_count(discard: usize, player: usize, opponent: usize) -> usize {
    CARDS_PER_DECK.saturating_sub(discard + player + opponent + 1)
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    /// `kind` is `computer` or `server`.
    pub fn new(dir: &Path, kind: &str) -> SaveStore {
        SaveStore {
            path: dir.join(format!("{}Game", kind)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Option<SaveGame>, SaveError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let lines: Vec<&str> = text.lines().collect();
        SaveGame::from_lines(&lines).map(Some)
    }

    pub fn store(&self, save: &SaveGame) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut text = save.to_lines().join("\n");
        text.push('\n');
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn delete(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), "could not delete save: {}", e);
            }
        }
    }
}
