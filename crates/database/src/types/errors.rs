//! Error types for the messaging core.

use thiserror::Error;

/// Result type alias for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

/// Main error type for the messaging core
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Sender equals recipient, or an identity is empty. Surfaced to the
    /// caller, never retried.
    #[error("invalid participants: {0}")]
    InvalidParticipants(String),

    /// A text message arrived with an empty payload.
    #[error("text messages must carry non-empty content")]
    EmptyContent,

    /// The durability layer could not be reached or a query failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("database migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for MessagingError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
