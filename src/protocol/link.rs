use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::config::NetConfig;
use crate::error::UnoError;
use crate::game::cards::{decode_cards, UnoCard};
use crate::game::sequencer::{Command, RemoteMove};
use crate::protocol::mailbox::Mailbox;
use crate::protocol::message::{format_line, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No socket yet, or the last one dropped.
    Detached,
    Open,
    /// Closed on purpose by either side. Never reopens.
    Closed,
}

struct Inner {
    net: NetConfig,
    name: String,
    outbound: Mutex<Option<UnboundedSender<String>>>,
    mailbox: Mailbox,
    state: Mutex<LinkState>,
    version_established: AtomicBool,
}

/// The game's end of a peer connection. Survives reconnects: the transport
/// attaches a fresh socket writer and feeds every line it reads to
/// [`PeerLink::dispatch`].
#[derive(Clone)]
pub struct PeerLink {
    inner: Arc<Inner>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PeerLink {
    pub fn new(net: NetConfig, name: &str) -> PeerLink {
        let mailbox = Mailbox::new(
            net.mailbox_attempts,
            Duration::from_millis(net.mailbox_step_ms),
        );
        PeerLink {
            inner: Arc::new(Inner {
                net,
                name: name.to_string(),
                outbound: Mutex::new(None),
                mailbox,
                state: Mutex::new(LinkState::Detached),
                version_established: AtomicBool::new(false),
            }),
        }
    }

    pub fn net(&self) -> &NetConfig {
        &self.inner.net
    }

    /// Lets `kind` be waited for instead of dispatched as a move.
    pub fn enable(&self, kind: &str) {
        self.inner.mailbox.enable(kind);
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.inner.mailbox
    }

    pub fn state(&self) -> LinkState {
        *lock(&self.inner.state)
    }

    pub fn is_open(&self) -> bool {
        self.state() == LinkState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state() == LinkState::Closed
    }

    pub fn version_established(&self) -> bool {
        self.inner.version_established.load(Ordering::SeqCst)
    }

    /// Starts a session on a new socket and greets the peer.
    pub fn attach(&self, outbound: UnboundedSender<String>) {
        {
            let mut state = lock(&self.inner.state);
            if *state == LinkState::Closed {
                return;
            }
            *state = LinkState::Open;
        }
        self.inner.version_established.store(false, Ordering::SeqCst);
        self.inner.mailbox.clear();
        *lock(&self.inner.outbound) = Some(outbound);
        self.write("version", &self.inner.net.version.to_string());
        self.write("?setName", &self.inner.name);
    }

    /// The socket went away without a close; waiters see `ConnectionLost`.
    pub fn detach(&self) {
        {
            let mut state = lock(&self.inner.state);
            if *state == LinkState::Open {
                *state = LinkState::Detached;
            }
        }
        lock(&self.inner.outbound).take();
        self.inner.mailbox.interrupt();
    }

    /// Returns `true` only for the call that actually closed the link.
    pub fn close(&self) -> bool {
        {
            let mut state = lock(&self.inner.state);
            if *state == LinkState::Closed {
                return false;
            }
            *state = LinkState::Closed;
        }
        // dropping the sender lets the writer flush what is queued and stop
        lock(&self.inner.outbound).take();
        self.inner.mailbox.interrupt();
        info!("connection closed");
        true
    }

    pub fn write(&self, kind: &str, contents: &str) {
        let line = format_line(kind, contents);
        match lock(&self.inner.outbound).as_ref() {
            Some(tx) => {
                debug!(target: "uno_duel::wire", "> {}", line);
                if tx.send(line).is_err() {
                    debug!("writer already stopped");
                }
            }
            None => debug!(%line, "no connection, message dropped"),
        }
    }

    /// Blocks until the peer sends `kind`. A peer that never does is told
    /// so and the link is closed.
    pub fn wait_for(&self, kind: &str) -> Result<String, UnoError> {
        if !self.is_open() {
            return Err(UnoError::ConnectionLost);
        }
        match self.inner.mailbox.wait_for(kind) {
            Err(UnoError::MissingMessage(kind)) => {
                self.write("invalid", &format!("expected:{}", kind));
                self.close();
                Err(UnoError::MissingMessage(kind))
            }
            Err(UnoError::ConnectionLost) if self.is_closed() => Err(UnoError::OpponentClosed),
            other => other,
        }
    }

    /// Tells the peer it broke the rules and ends the session.
    pub fn invalid(&self, reason: &str) -> UnoError {
        error!("{}", reason);
        self.write("invalid", reason);
        self.close();
        UnoError::Desynchronized(reason.to_string())
    }

    /// Routes one received line. Moves come back as commands for the
    /// sequencer; replies go to the mailbox.
    pub fn dispatch(&self, line: &str) -> Option<Command> {
        if self.is_closed() {
            return None;
        }
        debug!(target: "uno_duel::wire", "< {}", line.trim_end());
        let message = Message::parse(line);
        match self.route(&message) {
            Ok(command) => command,
            Err(e) => {
                self.write("invalid", &format!("malformed:{}", message));
                self.close();
                Some(Command::Fatal(e))
            }
        }
    }

    fn route(&self, message: &Message) -> Result<Option<Command>, UnoError> {
        let contents = message.contents();
        let malformed = || UnoError::InvalidMessage(message.to_string());
        let remote = |mv: RemoteMove| -> Result<Option<Command>, UnoError> {
            Ok(Some(Command::Remote(mv)))
        };
        match message.kind.as_str() {
            "drawCard" => remote(RemoteMove::DrawCard),
            "finishTurnEarly" => remote(RemoteMove::FinishTurnEarly),
            "playCard" => {
                let (index, card) = contents.split_once(' ').ok_or_else(malformed)?;
                let index = index.parse::<usize>().map_err(|_| malformed())?;
                let card = UnoCard::decode(card)?;
                remote(RemoteMove::PlayCard { index, card })
            }
            "reveal" => remote(RemoteMove::Reveal(decode_cards(contents)?)),
            "chat" => remote(RemoteMove::Chat(contents.to_string())),
            "setName" => remote(RemoteMove::SetName(contents.to_string())),
            "version" => {
                let version = contents.parse::<u32>().map_err(|_| malformed())?;
                self.inner.version_established.store(true, Ordering::SeqCst);
                if self.inner.net.is_compatible(version) {
                    info!(version, "opponent version");
                    Ok(None)
                } else {
                    let floor = self.inner.net.back_compat;
                    self.write("incompatible", &floor.to_string());
                    self.close();
                    Ok(Some(Command::Fatal(UnoError::OpponentIncompatible(floor))))
                }
            }
            "incompatible" => {
                let floor = contents.parse::<u32>().map_err(|_| malformed())?;
                self.close();
                Ok(Some(Command::Fatal(UnoError::PlayerIncompatible(floor))))
            }
            "invalid" => {
                self.close();
                Ok(Some(Command::Fatal(UnoError::Desynchronized(format!(
                    "opponent reported `{}`",
                    contents
                )))))
            }
            "close" => {
                self.close();
                Ok(Some(Command::Fatal(UnoError::OpponentClosed)))
            }
            "debug" => Ok(None),
            kind if self.inner.mailbox.is_enabled(kind) => {
                if kind == "reset" {
                    // anything buffered before a reset belongs to the old round
                    self.inner.mailbox.discard_except(kind);
                }
                self.inner.mailbox.deliver(kind, contents.to_string());
                Ok(None)
            }
            kind if message.optional => {
                debug!(kind, "ignoring optional message");
                Ok(None)
            }
            kind => {
                warn!(kind, "unknown message");
                self.write("invalid", &format!("undefined:{}", kind));
                self.close();
                Ok(Some(Command::Fatal(UnoError::UnknownMessage(kind.to_string()))))
            }
        }
    }
}
