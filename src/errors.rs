//! Error taxonomy shared by the game engine, the custom-deck catalogue, and
//! the registries. Every failure carries a short human-readable message that
//! the API layer returns to callers unmodified.

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    PreconditionFailed,
    ResourceExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    ResourceExhausted(String),
}

impl GameError {
    pub fn not_found(message: impl Into<String>) -> Self {
        GameError::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GameError::InvalidArgument(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        GameError::PreconditionFailed(message.into())
    }

    pub fn exhausted(message: impl Into<String>) -> Self {
        GameError::ResourceExhausted(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NotFound(_) => ErrorKind::NotFound,
            GameError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GameError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            GameError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
