pub mod cards;
pub mod computer;
pub mod deck;
pub mod events;
pub mod hand;
pub mod opponent;
pub mod save;
pub mod sequencer;
pub mod state;
pub use cards::*;
pub use events::GameEvent;
pub use hand::{CardView, Hand, HandController, LocalPlayer};
pub use opponent::Opponent;
pub use sequencer::{Command, Event, Input, RemoteMove, Sequencer, Table};
pub use state::{GameState, Phase, RoundSnapshot, Side};
