use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("malformed card `{0}`")]
    Malformed(String),
    #[error("wild card color has not been chosen")]
    ColorNotSet,
}

/// Failures that end a connection or a game. Normal turn flow never produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnoError {
    #[error("game desynchronized: {0}")]
    Desynchronized(String),
    #[error("opponent sent an unknown message `{0}`")]
    UnknownMessage(String),
    #[error("opponent sent a malformed message `{0}`")]
    InvalidMessage(String),
    #[error("opponent never sent `{0}`")]
    MissingMessage(String),
    #[error("opponent's version is too old (needs at least {0})")]
    OpponentIncompatible(u32),
    #[error("your version is too old for the opponent (needs at least {0})")]
    PlayerIncompatible(u32),
    #[error("connection to the opponent was lost")]
    ConnectionLost,
    #[error("could not connect to {addr} after {attempts} attempts")]
    ConnectFailed { addr: String, attempts: u32 },
    #[error("opponent closed the game")]
    OpponentClosed,
    #[error("i/o error: {0}")]
    Io(String),
    #[error(transparent)]
    Malformed(#[from] CardError),
}

impl From<std::io::Error> for UnoError {
    fn from(e: std::io::Error) -> Self {
        UnoError::Io(e.to_string())
    }
}

impl UnoError {
    /// Whether the round can wait for a reconnect instead of ending the game.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, UnoError::ConnectionLost)
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file is missing line {0}")]
    MissingLine(usize),
    #[error("save file has a bad flag `{0}`")]
    BadFlag(String),
    #[error("save file holds {0} cards instead of 108")]
    CardCount(usize),
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
