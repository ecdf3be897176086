use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use uno_duel::config::{AiConfig, Timing};
use uno_duel::game::computer::Computer;
use uno_duel::game::deck::{Dealer, Deck, INITIAL_DECK_COUNT};
use uno_duel::game::*;
use uno_duel::ports::bus::{ChannelHandler, EventBus};
use uno_duel::UnoError;

struct Game {
    seq: Sequencer,
    tx: flume::Sender<Command>,
    events: flume::Receiver<GameEvent>,
}

impl Game {
    fn new(seed: u64, timing: Timing) -> Game {
        let dealer = Dealer::new(Deck::new(StdRng::seed_from_u64(seed), 10), None, true);
        let ai = AiConfig {
            think_ms: 0,
            follow_up_ms: 0,
            max_bias: 3,
        };
        let computer = Computer::new(dealer, StdRng::seed_from_u64(seed + 100), ai);
        let (tx, rx) = flume::unbounded();
        let (ev_tx, events) = flume::unbounded();
        let mut bus = EventBus::new();
        bus.register_handler(Box::new(ChannelHandler::new(ev_tx)));
        let seq = Sequencer::new(Box::new(computer), rx, bus, timing);
        Game { seq, tx, events }
    }

    fn send(&self, input: Input) {
        self.tx.send(Command::Input(input)).unwrap();
    }

    fn drain(&self) -> Vec<GameEvent> {
        self.events.try_iter().collect()
    }
}

/// Plays the first playable card, or draws.
fn player_move(seq: &Sequencer) -> Input {
    let state = seq.state();
    if state.has_drawn {
        return match seq.player().drawn_playable() {
            Some(index) => Input::Play {
                index,
                color: Some(Color::GREEN),
            },
            None => Input::KeepDrawn,
        };
    }
    let top = state.top_card().unwrap();
    let playable = state
        .player
        .cards()
        .iter()
        .position(|v| v.card.map_or(false, |c| c.can_play_on(&top)));
    match playable {
        Some(index) => Input::Play {
            index,
            color: Some(Color::GREEN),
        },
        None => Input::Draw,
    }
}

#[cfg(test)]
mod sequencer_test {
    use super::*;

    #[test]
    fn test_one_event_at_a_time() {
        let mut game = Game::new(1, Timing::default());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        assert_eq!(game.seq.events_started(), 0);

        game.seq.tick(t0).unwrap();
        assert_eq!(game.seq.events_started(), 1);
        assert_eq!(game.seq.state().opponent.len(), 1);
        assert_eq!(game.seq.state().player.len(), 0);

        game.seq.tick(t0 + Duration::from_millis(100)).unwrap();
        game.seq.tick(t0 + Duration::from_millis(249)).unwrap();
        assert_eq!(game.seq.events_started(), 1);
        assert_eq!(game.seq.state().player.len(), 0);

        game.seq.tick(t0 + Duration::from_millis(250)).unwrap();
        assert_eq!(game.seq.events_started(), 2);
        assert_eq!(game.seq.state().player.len(), 1);
    }

    #[test]
    fn test_deal_with_animations() {
        let mut game = Game::new(2, Timing::default());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.seq.tick(t0).unwrap();
        // input during the deal is dropped, not deferred
        game.send(Input::Draw);
        for i in 1..=20 {
            game.seq.tick(t0 + Duration::from_millis(250 * i)).unwrap();
        }
        let state = game.seq.state();
        assert!(state.in_progress());
        assert_eq!(state.player.len(), 7);
        assert_eq!(state.opponent.len(), 7);
        assert!(game.seq.accepts_input());
        assert_eq!(game.seq.cards_in_deck(), INITIAL_DECK_COUNT);
        assert_eq!(state.card_total(game.seq.cards_in_deck()), CARDS_PER_DECK);
    }

    #[test]
    fn test_instant_deal_events() {
        let mut game = Game::new(3, Timing::instant());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.seq.tick(t0).unwrap();

        let events = game.drain();
        assert_eq!(events[0], GameEvent::RoundStarted { player_starts: true });
        let dealt = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CardDealt { .. }))
            .count();
        assert_eq!(dealt, 14);
        assert!(events.contains(&GameEvent::TurnStarted { side: Side::Player }));
        let top = game.seq.state().top_card().unwrap();
        assert!(top.is_numeric());
        assert!(game.seq.is_idle());

        // the display order follows order codes
        let state = game.seq.state();
        let codes: Vec<u8> = game
            .seq
            .player()
            .display_order()
            .iter()
            .map(|&i| state.player.get(i).unwrap().card.unwrap().order_code())
            .collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn test_input_gating() {
        let mut game = Game::new(4, Timing::instant());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.seq.tick(t0).unwrap();
        game.drain();

        game.send(Input::Play {
            index: 99,
            color: None,
        });
        game.send(Input::KeepDrawn);
        game.seq.tick(t0).unwrap();
        assert_eq!(game.seq.state().player.len(), 7);
        assert_eq!(game.seq.state().turn, Side::Player);
        assert!(game.seq.can_draw());

        game.send(Input::Draw);
        game.seq.tick(t0).unwrap();
        let events = game.drain();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CardDrawn {
                side: Side::Player,
                card: Some(_)
            }
        )));

        let state = game.seq.state();
        if state.turn == Side::Player && state.has_drawn {
            // the drawn card is playable and waits for a play-or-keep answer
            let drawn = game.seq.player().drawn_playable().unwrap();
            assert!(events.contains(&GameEvent::DrawnCardPlayable { index: drawn }));
            assert!(state.player.get(drawn).unwrap().highlighted);
            assert!(!game.seq.can_draw());
            game.send(Input::Draw);
            game.seq.tick(t0).unwrap();
            assert_eq!(game.seq.state().player.len(), 8);

            game.send(Input::KeepDrawn);
            game.seq.tick(t0).unwrap();
            assert!(game.drain().contains(&GameEvent::TurnFinished {
                side: Side::Player,
                early: true
            }));
        } else {
            assert!(events.contains(&GameEvent::TurnFinished {
                side: Side::Player,
                early: true
            }));
        }
        assert!(game.seq.state().player.len() >= 8);
    }

    #[test]
    fn test_full_round_against_computer() {
        for seed in 10..14 {
            let mut game = Game::new(seed, Timing::instant());
            let mut now = Instant::now();
            game.seq.begin(now).unwrap();
            let mut result = None;
            for _ in 0..5000 {
                now += Duration::from_millis(5);
                game.seq.tick(now).unwrap();
                for event in game.drain() {
                    if let GameEvent::GameOver { winner, score } = event {
                        result = Some((winner, score));
                    }
                }
                if result.is_some() {
                    break;
                }
                let state = game.seq.state();
                if state.in_progress() && game.seq.is_idle() {
                    assert_eq!(state.card_total(game.seq.cards_in_deck()), CARDS_PER_DECK);
                }
                if game.seq.accepts_input() {
                    game.send(player_move(&game.seq));
                }
            }

            let (winner, score) = result.expect("round should finish");
            let state = game.seq.state();
            assert!(matches!(state.phase, Phase::RoundOver { .. }));
            assert!(state.hand(winner).is_empty());
            assert_eq!(score, state.hand(winner.other()).score());
            assert_eq!(game.seq.countdown(now), Some(0));
            // the computer's hand is shown once the round is over
            assert!(state.opponent.cards().iter().all(|v| v.face_up));

            // countdown elapsed: the next round is dealt
            game.seq.tick(now + Duration::from_millis(1)).unwrap();
            let events = game.drain();
            assert!(events.contains(&GameEvent::RoundStarted { player_starts: true }));
            assert_eq!(game.seq.state().player.len(), 7);
        }
    }

    #[test]
    fn test_chat_is_always_accepted() {
        let mut game = Game::new(5, Timing::default());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.send(Input::Chat("hello".to_string()));
        game.seq.tick(t0).unwrap();
        assert!(game.drain().contains(&GameEvent::Chat {
            from: Side::Player,
            text: "hello".to_string()
        }));
    }

    #[test]
    fn test_disconnect_suspends_until_connected() {
        let mut game = Game::new(6, Timing::instant());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.seq.tick(t0).unwrap();
        let hand = game.seq.state().player.len();

        game.tx.send(Command::Disconnected).unwrap();
        game.seq.tick(t0).unwrap();
        assert!(game.seq.is_suspended());
        assert!(!game.seq.accepts_input());
        assert!(game.drain().contains(&GameEvent::Disconnected));

        game.tx.send(Command::Connected { resumed: true }).unwrap();
        game.seq.tick(t0).unwrap();
        assert!(!game.seq.is_suspended());
        assert!(game.drain().contains(&GameEvent::Resynchronized));
        // the round carries on rather than being dealt again
        assert_eq!(game.seq.state().player.len(), hand);
        assert!(game.seq.accepts_input());
    }

    #[test]
    fn test_suspended_round_does_not_advance() {
        let mut game = Game::new(8, Timing::default());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.seq.tick(t0).unwrap();
        game.tx.send(Command::Disconnected).unwrap();
        game.seq.tick(t0 + Duration::from_millis(250)).unwrap();
        assert!(game.seq.is_suspended());

        let started = game.seq.events_started();
        for i in 2..40 {
            game.seq.tick(t0 + Duration::from_millis(250 * i)).unwrap();
        }
        assert_eq!(game.seq.events_started(), started);

        game.tx.send(Command::Connected { resumed: true }).unwrap();
        game.seq.tick(t0 + Duration::from_secs(20)).unwrap();
        assert!(!game.seq.is_suspended());
        assert!(game.seq.events_started() > started);
    }

    #[test]
    fn test_fatal_command_stops_the_game() {
        let mut game = Game::new(7, Timing::instant());
        let t0 = Instant::now();
        game.seq.begin(t0).unwrap();
        game.tx.send(Command::Fatal(UnoError::OpponentClosed)).unwrap();

        assert_eq!(game.seq.tick(t0), Err(UnoError::OpponentClosed));
        assert_eq!(game.seq.fatal(), Some(&UnoError::OpponentClosed));
        assert!(game.drain().iter().any(|e| matches!(e, GameEvent::Fatal { .. })));
        assert_eq!(game.seq.tick(t0), Err(UnoError::OpponentClosed));
    }
}
