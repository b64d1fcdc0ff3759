//! Common error types for learning-cards

use thiserror::Error;

/// Common result type for learning-cards operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the core and the server
#[derive(Error, Debug)]
pub enum Error {
    /// Store unavailable or query failure (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error that is not tied to a field count
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or revision conflict in the progress store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Catalog row that cannot be ingested
    ///
    /// `line` is 1-based and counts the header row.
    #[error("Malformed input in {origin} on line {line}: {message}")]
    MalformedInput {
        origin: String,
        line: u64,
        message: String,
    },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for uniqueness/revision conflicts
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
