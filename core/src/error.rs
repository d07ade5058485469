use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board must have at least one row and one column")]
    InvalidDimensions,
    #[error("Mine count must be positive and leave at least one safe cell")]
    InvalidMineCount,
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("Game already ended, no new moves are accepted")]
    GameOver,
    #[error("Unrecognized flag marker")]
    InvalidMarker,
}

impl GameError {
    /// Stable identifier for callers that map errors onto responses.
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidDimensions => "invalid_dimensions",
            Self::InvalidMineCount => "invalid_mine_count",
            Self::OutOfBounds => "out_of_bounds",
            Self::GameOver => "game_already_over",
            Self::InvalidMarker => "invalid_marker",
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
