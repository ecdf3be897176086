use crate::game::events::GameEvent;

pub trait EventHandler: Send + Sync {
    fn handle_events(&self, events: &[GameEvent]);
}

#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, h: Box<dyn EventHandler>) {
        self.handlers.push(h);
    }

    pub fn publish_events(&self, events: &[GameEvent]) {
        for handler in &self.handlers {
            handler.handle_events(events);
        }
    }

    pub fn publish<I>(&self, events: I)
    where
        I: IntoIterator<Item = GameEvent>,
    {
        let events: Vec<GameEvent> = events.into_iter().collect();
        self.publish_events(&events);
    }
}

pub struct TracingLogger;

impl EventHandler for TracingLogger {
    fn handle_events(&self, events: &[GameEvent]) {
        for event in events {
            tracing::debug!(target: "uno_duel::events", "{}", event);
        }
    }
}

/// Forwards events to another thread, usually the front end's log pane.
pub struct ChannelHandler {
    tx: flume::Sender<GameEvent>,
}

impl ChannelHandler {
    pub fn new(tx: flume::Sender<GameEvent>) -> Self {
        ChannelHandler { tx }
    }
}

impl EventHandler for ChannelHandler {
    fn handle_events(&self, events: &[GameEvent]) {
        for event in events {
            // a closed receiver only means nobody is watching any more
            let _ = self.tx.send(event.clone());
        }
    }
}
