//! Error types for lichess-overlay-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("Illegal move '{san}': {reason}")]
    IllegalMove { san: String, reason: String },

    #[error("Cannot give the move to {side:?}: {reason}")]
    SideToMove { side: shakmaty::Color, reason: String },

    #[error("Host element not found: {0}")]
    MissingHostElement(&'static str),

    #[error("Board element not found")]
    MissingBoardElement,

    #[error("Unusable board bounds: {0}")]
    InvalidBoard(String),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("PGN parsing error: {0}")]
    Pgn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the rules engine rejected host-supplied input.
    pub fn is_adapter_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidPosition { .. } | Error::IllegalMove { .. } | Error::SideToMove { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
