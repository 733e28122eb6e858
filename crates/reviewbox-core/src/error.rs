//! Error types for reviewbox-core

use thiserror::Error;

use crate::models::ReviewId;

/// Result type alias using reviewbox-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reviewbox-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Key-value backend error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required review field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The acting session lacks rights for the requested mutation
    #[error("{0}")]
    Unauthorized(String),

    /// Review not found
    #[error("Review not found: {0}")]
    NotFound(ReviewId),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether this error should be shown to the user as an authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
