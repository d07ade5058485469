use std::io;
use std::time::Duration;

use minesweeper_core::GameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Stored document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Storage worker stopped before answering")]
    WorkerLost,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Game not found")]
    GameNotFound,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    /// Stable identifier for callers that map errors onto responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Game(err) => err.code(),
            Self::GameNotFound => "not_found",
            Self::Storage(_) => "storage_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ServiceError::from(GameError::GameOver).code(), "game_already_over");
        assert_eq!(ServiceError::from(GameError::OutOfBounds).code(), "out_of_bounds");
        assert_eq!(ServiceError::GameNotFound.code(), "not_found");
        assert_eq!(
            ServiceError::from(StoreError::Timeout(Duration::from_millis(5))).code(),
            "storage_failure"
        );
    }
}
