use crate::error::UnoError;
use crate::game::cards::UnoCard;
use crate::game::hand::HandController;
use crate::game::sequencer::Table;
use crate::game::state::{GameState, Side};

/// The other side of the table: the computer, or a peer over the network.
///
/// Methods named `player_*` tell the opponent what the local player just
/// did; they are called from event starts on the local player's turn.
pub trait Opponent: HandController + Send {
    fn name(&self) -> &str;

    /// Whether this side owns the physical deck and can export the round.
    fn holds_deck(&self) -> bool;

    fn player_can_start(&mut self) -> Result<bool, UnoError>;

    /// Queues the deal (or a restore) for a new round.
    fn start_round(&mut self, table: &mut Table<'_>) -> Result<(), UnoError>;

    /// A card the local player may see.
    fn draw_visible(&mut self, discard: &mut Vec<UnoCard>) -> Result<UnoCard, UnoError>;

    /// A card for the opponent's hand; `None` when this side cannot know it.
    fn draw_hidden(&mut self, discard: &mut Vec<UnoCard>) -> Result<Option<UnoCard>, UnoError>;

    fn cards_in_deck(&self) -> usize;

    fn player_drew(&mut self) {}

    fn player_played(&mut self, _index: usize, _card: UnoCard) {}

    fn player_finished_early(&mut self) {}

    /// Shows the local player's remaining cards at the end of a round.
    fn reveal(&mut self, _cards: &[UnoCard]) {}

    fn chat(&mut self, _text: &str) {}

    /// Synchronizes with the opponent before a new deal.
    fn will_reset(&mut self) -> Result<(), UnoError> {
        Ok(())
    }

    fn can_save(&mut self, _state: &GameState) {}

    fn round_over(&mut self, _winner: Side) {}

    /// Reports an illegal opponent move and returns the error that ends the game.
    fn desync(&mut self, reason: &str) -> UnoError {
        UnoError::Desynchronized(reason.to_string())
    }

    /// Sends the whole round to a peer that reconnected mid-round.
    fn export_round(&mut self, _state: &GameState) -> Result<(), UnoError> {
        Ok(())
    }

    fn close(&mut self) {}
}
