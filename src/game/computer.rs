use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::config::AiConfig;
use crate::error::UnoError;
use crate::game::cards::{Color, UnoCard};
use crate::game::deck::{Dealer, Round};
use crate::game::hand::HandController;
use crate::game::opponent::Opponent;
use crate::game::sequencer::{Event, Table};
use crate::game::state::{GameState, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Play { index: usize, color: Option<Color> },
    Draw,
    FinishEarly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub decision: Decision,
    pub best_color: Color,
    pub alternate_color: Color,
}

/// Picks a move for `hand` on `top`.
///
/// In order of preference: a wild to block an opponent about to win, a
/// card of the top's color (numeric first), a card of the color the hand
/// holds most of, a wild when hands are getting small, and otherwise a draw.
/// `bias` occasionally makes it settle for a weaker card or the runner-up
/// color, but never while the opponent holds a single card.
pub fn decide<R: Rng + ?Sized>(
    hand: &[UnoCard],
    top: &UnoCard,
    opponent_size: usize,
    has_drawn: bool,
    bias: u32,
    rng: &mut R,
) -> Choice {
    let mut color_counts = [0usize; 4];
    for card in hand.iter().filter(|c| !c.is_wild()) {
        if let Some(color) = card.color() {
            color_counts[color.to_u8() as usize] += 1;
        }
    }
    let target = top.color().map(|c| c.to_u8() as usize);
    let offset = rng.gen_range(0..4);
    let mut best = offset;
    let mut best_count = 0;
    let mut alternate = (offset + 1) % 4;
    let mut alternate_count = 0;
    for i in offset..offset + 4 {
        let index = i % 4;
        let count = color_counts[index];
        if Some(index) == target {
            continue;
        }
        if count > best_count {
            if best_count > 0 {
                alternate = best;
                alternate_count = best_count;
            }
            best = index;
            best_count = count;
        } else if count > alternate_count && index != best {
            alternate = index;
            alternate_count = count;
        }
    }
    if alternate == best {
        alternate = (best + 1) % 4;
    }
    let best_color = Color::from_u8(best as u8).unwrap_or(Color::RED);
    let alternate_color = Color::from_u8(alternate as u8).unwrap_or(Color::YELLOW);

    let mut playable = None;
    let mut non_wild = None;
    let mut non_wild_count = 0;
    let mut weakest: Option<(usize, usize)> = None;
    let mut match_color = None;
    let mut blocking = false;
    for c in (0..hand.len()).rev() {
        let card = hand[c];
        if !card.can_play_on(top) {
            continue;
        }
        playable = Some(c);
        if let Some(color) = card.color().filter(|_| !card.is_wild()) {
            let color = color.to_u8() as usize;
            let count = color_counts[color];
            if count > non_wild_count {
                non_wild = Some(c);
                non_wild_count = count;
            }
            if weakest.map_or(true, |(_, n)| count < n) {
                weakest = Some((c, count));
            }
            if Some(color) == target {
                match_color = Some(c);
                if card.is_numeric() {
                    break;
                }
            }
        } else if opponent_size == 1 || (opponent_size == 2 && rng.gen_bool(0.5)) {
            match_color = Some(c);
            blocking = true;
            break;
        }
    }

    let wild_color = |index: usize| hand[index].is_wild().then_some(best_color);
    let mut decision = if let Some(index) = match_color {
        Decision::Play {
            index,
            color: wild_color(index),
        }
    } else if let Some(index) = non_wild {
        Decision::Play { index, color: None }
    } else if let Some(index) = playable.filter(|_| {
        hand.len() <= 3 || opponent_size <= 3 || rng.gen_range(0..4) == 0
    }) {
        Decision::Play {
            index,
            color: wild_color(index),
        }
    } else if has_drawn {
        Decision::FinishEarly
    } else {
        Decision::Draw
    };

    if !blocking && opponent_size > 1 && bias > 0 && rng.gen_range(0..8) < bias {
        if let Decision::Play { index, color } = decision {
            decision = match (color, weakest) {
                (Some(_), _) => Decision::Play {
                    index,
                    color: Some(alternate_color),
                },
                (None, Some((weak, _))) => Decision::Play {
                    index: weak,
                    color: None,
                },
                (None, None) => decision,
            };
            debug!(?decision, bias, "computer eased off");
        }
    }

    Choice {
        decision,
        best_color,
        alternate_color,
    }
}

/// The computer opponent. Holds the deck and its save file.
pub struct Computer {
    dealer: Dealer,
    rng: StdRng,
    ai: AiConfig,
    best_color: Color,
    bias: u32,
}

impl Computer {
    pub fn new(dealer: Dealer, rng: StdRng, ai: AiConfig) -> Computer {
        Computer {
            dealer,
            rng,
            ai,
            best_color: Color::RED,
            bias: 0,
        }
    }

    pub fn bias(&self) -> u32 {
        self.bias
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }
}

impl HandController for Computer {
    fn on_turn_start(&mut self, table: &mut Table<'_>, opponent_size: usize) {
        table.delay(Duration::from_millis(self.ai.think_ms));
        let Some(top) = table.top_card() else {
            table.push(Event::Draw {
                side: Side::Opponent,
                voluntary: true,
            });
            return;
        };
        let Some(hand) = table.state.opponent.known_cards() else {
            tracing::error!("computer hand holds hidden cards");
            table.push(Event::FinishTurn { early: true });
            return;
        };
        let choice = decide(
            &hand,
            &top,
            opponent_size,
            table.state.has_drawn,
            self.bias,
            &mut self.rng,
        );
        self.best_color = choice.best_color;
        debug!(?choice, "computer decided");
        match choice.decision {
            Decision::Play { index, color } => table.push(Event::Play { index, color }),
            Decision::Draw => table.push(Event::Draw {
                side: Side::Opponent,
                voluntary: true,
            }),
            Decision::FinishEarly => table.push(Event::FinishTurn { early: true }),
        }
    }

    fn on_add_card(&mut self, table: &mut Table<'_>, index: usize) {
        if !table.state.opponent.is_turn {
            return;
        }
        let card = table.state.opponent.get(index).and_then(|v| v.card);
        match (card, table.top_card()) {
            (Some(card), Some(top)) if card.can_play_on(&top) => {
                let color = card.is_wild().then_some(self.best_color);
                table.delay(Duration::from_millis(self.ai.follow_up_ms));
                table.push(Event::Play { index, color });
            }
            _ => table.push(Event::FinishTurn { early: true }),
        }
    }
}

impl Opponent for Computer {
    fn name(&self) -> &str {
        "Computer"
    }

    fn holds_deck(&self) -> bool {
        true
    }

    fn player_can_start(&mut self) -> Result<bool, UnoError> {
        Ok(true)
    }

    fn start_round(&mut self, table: &mut Table<'_>) -> Result<(), UnoError> {
        match self.dealer.start_round() {
            Round::New(deal) => {
                let opponent = deal.opponent.into_iter().map(Some).collect();
                table.new_game(deal.top, deal.player, opponent);
            }
            Round::Restored(save) => table.restore(save.into_snapshot()),
        }
        Ok(())
    }

    fn draw_visible(&mut self, discard: &mut Vec<UnoCard>) -> Result<UnoCard, UnoError> {
        Ok(self.dealer.draw(discard))
    }

    fn draw_hidden(&mut self, discard: &mut Vec<UnoCard>) -> Result<Option<UnoCard>, UnoError> {
        Ok(Some(self.dealer.draw(discard)))
    }

    fn cards_in_deck(&self) -> usize {
        self.dealer.count()
    }

    fn can_save(&mut self, state: &GameState) {
        self.dealer.save(state);
    }

    fn round_over(&mut self, winner: Side) {
        self.bias = match winner {
            Side::Opponent => (self.bias + 1).min(self.ai.max_bias),
            Side::Player => self.bias.saturating_sub(1),
        };
        debug!(bias = self.bias, "computer bias adjusted");
        self.dealer.discard_save();
    }
}
