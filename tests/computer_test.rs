use std::collections::VecDeque;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use uno_duel::config::{AiConfig, Timing};
use uno_duel::game::computer::{decide, Computer, Decision};
use uno_duel::game::deck::{Dealer, Deck};
use uno_duel::game::*;

fn computer(seed: u64) -> Computer {
    let dealer = Dealer::new(Deck::new(StdRng::seed_from_u64(seed), 10), None, true);
    Computer::new(dealer, StdRng::seed_from_u64(seed + 1), AiConfig::default())
}

fn red(n: u8) -> UnoCard {
    UnoCard::NumberCard(Color::RED, Number::from_u8(n).unwrap())
}

#[cfg(test)]
mod computer_test {
    use super::*;

    #[test]
    fn test_decisions_are_legal() {
        for seed in 0..300u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cards = new_deck();
            cards.shuffle(&mut rng);
            let hand: Vec<UnoCard> = cards[..1 + (seed as usize % 9)].to_vec();
            let top = cards[20..].iter().copied().find(|c| c.is_numeric()).unwrap();
            let opponent_size = 1 + (seed as usize % 7);
            let has_drawn = seed % 5 == 0;
            let bias = (seed % 4) as u32;

            let choice = decide(&hand, &top, opponent_size, has_drawn, bias, &mut rng);
            assert_ne!(choice.best_color, choice.alternate_color);
            match choice.decision {
                Decision::Play { index, color } => {
                    let card = hand[index];
                    assert!(card.can_play_on(&top), "seed {}: {} on {}", seed, card, top);
                    assert_eq!(color.is_some(), card.is_wild());
                }
                Decision::Draw => {
                    assert!(!has_drawn);
                    assert!(hand.iter().all(|c| c.is_wild() || !c.can_play_on(&top)));
                }
                Decision::FinishEarly => assert!(has_drawn),
            }
        }
    }

    #[test]
    fn test_blocks_with_wild_when_opponent_has_one_card() {
        let hand = vec![red(5), red(7), UnoCard::WildCard(None, WildType::DRAWFOUR)];
        let top = UnoCard::NumberCard(Color::BLUE, Number::THREE);
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let choice = decide(&hand, &top, 1, false, 3, &mut rng);
            assert_eq!(
                choice.decision,
                Decision::Play {
                    index: 2,
                    color: Some(Color::RED)
                }
            );
        }
    }

    #[test]
    fn test_prefers_numeric_color_match() {
        let hand = vec![
            UnoCard::ActionCard(Color::GREEN, Action::SKIP),
            UnoCard::NumberCard(Color::GREEN, Number::TWO),
            UnoCard::NumberCard(Color::YELLOW, Number::FOUR),
        ];
        let top = UnoCard::NumberCard(Color::GREEN, Number::NINE);
        let mut rng = StdRng::seed_from_u64(1);
        let choice = decide(&hand, &top, 7, false, 0, &mut rng);
        assert_eq!(choice.decision, Decision::Play { index: 1, color: None });
    }

    #[test]
    fn test_best_color_skips_top_color() {
        let hand = vec![
            UnoCard::NumberCard(Color::BLUE, Number::ONE),
            UnoCard::NumberCard(Color::BLUE, Number::TWO),
            UnoCard::NumberCard(Color::BLUE, Number::THREE),
            UnoCard::NumberCard(Color::GREEN, Number::ONE),
            UnoCard::WildCard(None, WildType::WILD),
        ];
        let top = red(9);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let choice = decide(&hand, &top, 5, false, 0, &mut rng);
            assert_eq!(choice.best_color, Color::BLUE);
            assert_eq!(choice.alternate_color, Color::GREEN);
            assert!(matches!(
                choice.decision,
                Decision::Draw
                    | Decision::Play {
                        index: 4,
                        color: Some(Color::BLUE)
                    }
            ));
        }
    }

    #[test]
    fn test_turn_start_queues_one_move() {
        for seed in 0..50u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cards = new_deck();
            cards.shuffle(&mut rng);
            let top = cards.iter().copied().find(|c| c.is_numeric()).unwrap();

            let mut state = GameState::new();
            state.turn = Side::Opponent;
            state.phase = Phase::InProgress;
            state.top = Some(CardView::new(Some(top), true));
            for card in &cards[40..47] {
                state.opponent.push_card(CardView::new(Some(*card), false));
            }
            state.opponent.start_turn();
            let mut queue = VecDeque::new();
            let mut events = Vec::new();
            let timing = Timing::default();
            let mut table = Table::new(&mut state, &mut queue, &mut events, &timing, Instant::now());

            let mut ai = computer(seed);
            ai.on_turn_start(&mut table, 4);

            let moves: Vec<&Event> = queue
                .iter()
                .filter(|e| !matches!(e, Event::Delay(_)))
                .collect();
            assert_eq!(moves.len(), 1, "seed {}: {:?}", seed, queue);
            match moves[0] {
                Event::Play { index, .. } => {
                    let card = state.opponent.get(*index).unwrap().card.unwrap();
                    assert!(card.can_play_on(&top));
                }
                Event::Draw { side, voluntary } => {
                    assert_eq!(*side, Side::Opponent);
                    assert!(*voluntary);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_bias_follows_results() {
        let mut ai = computer(1);
        assert_eq!(ai.bias(), 0);
        for _ in 0..5 {
            ai.round_over(Side::Opponent);
        }
        assert_eq!(ai.bias(), AiConfig::default().max_bias);
        ai.round_over(Side::Player);
        assert_eq!(ai.bias(), AiConfig::default().max_bias - 1);
        for _ in 0..5 {
            ai.round_over(Side::Player);
        }
        assert_eq!(ai.bias(), 0);
    }
}
