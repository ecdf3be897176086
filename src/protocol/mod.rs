pub mod link;
pub mod mailbox;
pub mod message;
pub mod remote;
pub mod transport;

pub use link::{LinkState, PeerLink};
pub use mailbox::Mailbox;
pub use message::Message;
pub use remote::RemoteOpponent;
