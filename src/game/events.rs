use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::game::cards::UnoCard;
use crate::game::state::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted {
        player_starts: bool,
    },
    CardDealt {
        side: Side,
    },
    // the opponent's card is only known to the side that holds the deck
    CardDrawn {
        side: Side,
        card: Option<UnoCard>,
    },
    CardPlayed {
        side: Side,
        card: UnoCard,
    },
    TopCardChanged {
        top_card: UnoCard,
    },
    TurnStarted {
        side: Side,
    },
    DrawnCardPlayable {
        index: usize,
    },
    TurnFinished {
        side: Side,
        early: bool,
    },
    GameOver {
        winner: Side,
        score: i32,
    },
    Chat {
        from: Side,
        text: String,
    },
    OpponentNamed {
        name: String,
    },
    Disconnected,
    Resynchronized,
    Fatal {
        message: String,
    },
}

impl Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEvent::RoundStarted { player_starts } =>
                write!(f, "RoundStarted: player_starts={}", player_starts)?,
            GameEvent::CardDealt { side } =>
                write!(f, "CardDealt: side={}", side)?,
            GameEvent::CardDrawn { side, card: Some(card) } =>
                write!(f, "CardDrawn: side={}, card={}", side, card)?,
            GameEvent::CardDrawn { side, card: None } =>
                write!(f, "CardDrawn: side={}", side)?,
            GameEvent::CardPlayed { side, card } =>
                write!(f, "CardPlayed: side={}, card={}", side, card)?,
            GameEvent::TopCardChanged { top_card } =>
                write!(f, "TopCardChanged: top_card={}", top_card)?,
            GameEvent::TurnStarted { side } =>
                write!(f, "TurnStarted: side={}", side)?,
            GameEvent::DrawnCardPlayable { index } =>
                write!(f, "DrawnCardPlayable: index={}", index)?,
            GameEvent::TurnFinished { side, early } =>
                write!(f, "TurnFinished: side={}, early={}", side, early)?,
            GameEvent::GameOver { winner, score } =>
                write!(f, "GameOver: winner={}, score={}", winner, score)?,
            GameEvent::Chat { from, text } =>
                write!(f, "Chat: from={}, text={}", from, text)?,
            GameEvent::OpponentNamed { name } =>
                write!(f, "OpponentNamed: name={}", name)?,
            GameEvent::Disconnected =>
                write!(f, "Disconnected")?,
            GameEvent::Resynchronized =>
                write!(f, "Resynchronized")?,
            GameEvent::Fatal { message } =>
                write!(f, "Fatal: message={}", message)?,
        }
        Ok(())
    }
}
