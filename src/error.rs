use thiserror::Error;

/// Everything the battle core and session layer can refuse to do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Item {0} not found")]
    ItemNotFound(String),

    #[error("Item {0} has no uses left")]
    ItemExhausted(String),

    #[error("CPU has not selected a move yet")]
    CpuNotReady,

    #[error("Opponent catalog unavailable: {0}")]
    Catalog(String),
}

impl GameError {
    /// Stable code clients can match on.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            GameError::InvalidMove(_) => "INVALID_MOVE",
            GameError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            GameError::ItemExhausted(_) => "ITEM_EXHAUSTED",
            GameError::CpuNotReady => "CPU_NOT_READY",
            GameError::Catalog(_) => "CATALOG_ERROR",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
