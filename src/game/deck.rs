use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::game::cards::{self, UnoCard};
use crate::game::save::{SaveGame, SaveStore};
use crate::game::state::GameState;

pub const CARDS_PER_HAND: usize = 7;
pub const INITIAL_DECK_COUNT: usize = cards::CARDS_PER_DECK - CARDS_PER_HAND * 2 - 1;

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// The opening position of a fresh round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub top: UnoCard,
    pub player: Vec<UnoCard>,
    pub opponent: Vec<UnoCard>,
}

/// The draw pile, top at the end.
pub struct Deck {
    cards: Vec<UnoCard>,
    rng: StdRng,
    max_power_diff: i32,
}

impl Deck {
    pub fn new(rng: StdRng, max_power_diff: i32) -> Deck {
        Deck {
            cards: Vec::new(),
            rng,
            max_power_diff,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[UnoCard] {
        &self.cards
    }

    pub fn restore(&mut self, cards: Vec<UnoCard>) {
        self.cards = cards;
    }

    /// Pops the top card. An empty pile is rebuilt from `discard`, which
    /// must not contain the current top of the discard pile.
    pub fn draw(&mut self, discard: &mut Vec<UnoCard>) -> UnoCard {
        if self.cards.is_empty() {
            if discard.is_empty() {
                error!("draw pile and discard pile are both empty");
                return cards::low_value_card(&mut self.rng);
            }
            self.cards = discard.drain(..).map(UnoCard::cleared).collect();
            self.cards.shuffle(&mut self.rng);
            info!(count = self.cards.len(), "reshuffled discard pile into draw pile");
        }
        match self.cards.pop() {
            Some(card) => card,
            None => cards::low_value_card(&mut self.rng),
        }
    }

    pub fn start_game(&mut self) -> Deal {
        let order = cards::shuffled_deck(&mut self.rng);
        self.start_game_with(order)
    }

    /// Deals from `order` (top at the end) without shuffling.
    pub fn start_game_with(&mut self, order: Vec<UnoCard>) -> Deal {
        self.cards = order;
        let mut none = Vec::new();
        let mut player = Vec::with_capacity(CARDS_PER_HAND);
        let mut opponent = Vec::with_capacity(CARDS_PER_HAND);
        let mut advantage = 0;
        for _ in 0..CARDS_PER_HAND {
            let a = self.draw(&mut none);
            let b = self.draw(&mut none);
            let diff = a.power_code() - b.power_code();
            if (advantage + diff).abs() > self.max_power_diff {
                opponent.push(a);
                player.push(b);
                advantage -= diff;
            } else {
                player.push(a);
                opponent.push(b);
                advantage += diff;
            }
        }
        let top = match self.cards.iter().rposition(|c| c.is_numeric()) {
            Some(idx) => self.cards.remove(idx),
            None => {
                warn!("no numeric card left for the opening discard");
                self.draw(&mut none)
            }
        };
        debug!(%top, advantage, "dealt new round");
        Deal {
            top,
            player,
            opponent,
        }
    }
}

/// How the deck holder opens a round.
#[derive(Debug, Clone)]
pub enum Round {
    New(Deal),
    Restored(SaveGame),
}

/// The deck together with its save file, owned by whichever side holds the
/// physical deck.
pub struct Dealer {
    deck: Deck,
    store: Option<SaveStore>,
}

impl Dealer {
    pub fn new(deck: Deck, store: Option<SaveStore>, resume: bool) -> Dealer {
        if !resume {
            if let Some(store) = store.as_ref().filter(|s| s.exists()) {
                info!(path = %store.path().display(), "discarding saved round");
                store.delete();
            }
        }
        Dealer { deck, store }
    }

    pub fn count(&self) -> usize {
        self.deck.len()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn draw(&mut self, discard: &mut Vec<UnoCard>) -> UnoCard {
        self.deck.draw(discard)
    }

    pub fn start_round(&mut self) -> Round {
        if let Some(store) = &self.store {
            match store.load() {
                Ok(Some(save)) => {
                    info!(path = %store.path().display(), "resuming saved round");
                    self.deck.restore(save.draw_pile.clone());
                    return Round::Restored(save);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("discarding unreadable save: {}", e);
                    store.delete();
                }
            }
        }
        Round::New(self.deck.start_game())
    }

    pub fn save(&self, state: &GameState) {
        let Some(store) = &self.store else {
            return;
        };
        match SaveGame::capture(self.deck.cards(), state) {
            Some(save) => {
                if let Err(e) = store.store(&save) {
                    warn!("could not save round: {}", e);
                }
            }
            None => debug!("round not saveable yet"),
        }
    }

    pub fn discard_save(&self) {
        if let Some(store) = &self.store {
            store.delete();
        }
    }
}
