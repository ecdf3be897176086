use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use flume::RecvTimeoutError;
use tracing::warn;

use crate::error::UnoError;

#[derive(Default)]
struct Slot {
    pending: VecDeque<String>,
    waiting: VecDeque<flume::Sender<String>>,
}

/// Per-kind rendezvous between the socket reader and a thread waiting for a
/// reply. A message is handed to the oldest waiter, or kept until one asks.
pub struct Mailbox {
    slots: Mutex<HashMap<String, Slot>>,
    attempts: u32,
    step: Duration,
}

impl Mailbox {
    /// A waiter gives up after `attempts` waits of `step`, `2 * step`, ...
    pub fn new(attempts: u32, step: Duration) -> Mailbox {
        Mailbox {
            slots: Mutex::new(HashMap::new()),
            attempts,
            step,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enable(&self, kind: &str) {
        self.slots().entry(kind.to_string()).or_default();
    }

    pub fn is_enabled(&self, kind: &str) -> bool {
        self.slots().contains_key(kind)
    }

    /// Returns `false` when `kind` was never enabled.
    pub fn deliver(&self, kind: &str, contents: String) -> bool {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(kind) else {
            return false;
        };
        let mut contents = contents;
        while let Some(waiter) = slot.waiting.pop_front() {
            match waiter.send(contents) {
                Ok(()) => return true,
                // that waiter already gave up
                Err(flume::SendError(back)) => contents = back,
            }
        }
        slot.pending.push_back(contents);
        true
    }

    pub fn pending(&self, kind: &str) -> usize {
        self.slots().get(kind).map_or(0, |s| s.pending.len())
    }

    pub fn wait_for(&self, kind: &str) -> Result<String, UnoError> {
        let rx = {
            let mut slots = self.slots();
            let Some(slot) = slots.get_mut(kind) else {
                return Err(UnoError::UnknownMessage(kind.to_string()));
            };
            if let Some(contents) = slot.pending.pop_front() {
                return Ok(contents);
            }
            let (tx, rx) = flume::bounded(1);
            slot.waiting.push_back(tx);
            rx
        };
        for attempt in 1..=self.attempts {
            match rx.recv_timeout(self.step * attempt) {
                Ok(contents) => return Ok(contents),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(attempt, "still waiting for \"{}\" message...", kind)
                }
                Err(RecvTimeoutError::Disconnected) => return Err(UnoError::ConnectionLost),
            }
        }
        Err(UnoError::MissingMessage(kind.to_string()))
    }

    /// Wakes every waiter with `ConnectionLost`.
    pub fn interrupt(&self) {
        for slot in self.slots().values_mut() {
            slot.waiting.clear();
        }
    }

    /// Drops buffered messages of every kind except `keep`.
    pub fn discard_except(&self, keep: &str) {
        for (kind, slot) in self.slots().iter_mut() {
            if kind != keep {
                slot.pending.clear();
            }
        }
    }

    pub fn clear(&self) {
        for slot in self.slots().values_mut() {
            slot.pending.clear();
            slot.waiting.clear();
        }
    }
}
