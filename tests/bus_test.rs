use std::sync::{Arc, Mutex};

use uno_duel::game::*;
use uno_duel::ports::bus::{ChannelHandler, EventBus, EventHandler, TracingLogger};

/// Keeps every batch it is handed.
#[derive(Default, Clone)]
struct Recorder {
    batches: Arc<Mutex<Vec<Vec<GameEvent>>>>,
}

impl EventHandler for Recorder {
    fn handle_events(&self, events: &[GameEvent]) {
        self.batches.lock().unwrap().push(events.to_vec());
    }
}

#[cfg(test)]
mod bus_test {
    use super::*;

    #[test]
    fn test_log_bus() {
        let recorder = Recorder::default();
        let (tx, rx) = flume::unbounded();
        let mut bus = EventBus::new();
        bus.register_handler(Box::new(TracingLogger));
        bus.register_handler(Box::new(ChannelHandler::new(tx)));
        bus.register_handler(Box::new(recorder.clone()));

        let card = UnoCard::NumberCard(Color::RED, Number::FIVE);
        bus.publish([
            GameEvent::RoundStarted { player_starts: true },
            GameEvent::TopCardChanged { top_card: card },
        ]);
        bus.publish(Vec::new());

        let received: Vec<GameEvent> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1], GameEvent::TopCardChanged { top_card: card });

        let batches = recorder.batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches[1].is_empty());
    }

    #[test]
    fn test_channel_handler_outlives_receiver() {
        let (tx, rx) = flume::unbounded();
        let mut bus = EventBus::new();
        bus.register_handler(Box::new(ChannelHandler::new(tx)));
        drop(rx);
        bus.publish([GameEvent::Disconnected]);
    }

    #[test]
    fn test_event_display() {
        let event = GameEvent::CardDrawn {
            side: Side::Opponent,
            card: None,
        };
        assert_eq!(event.to_string(), "CardDrawn: side=Opponent");
        let event = GameEvent::GameOver {
            winner: Side::Player,
            score: 42,
        };
        assert_eq!(event.to_string(), "GameOver: winner=Player, score=42");
    }
}
