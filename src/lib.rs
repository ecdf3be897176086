pub mod config;
pub mod error;
pub mod game;
pub mod ports;
pub mod protocol;

pub use config::Config;
pub use error::{CardError, UnoError};
