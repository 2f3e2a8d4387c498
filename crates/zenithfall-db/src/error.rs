//! Error types for run storage.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Run blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No run stored for this user.
    #[error("Run not found: {0}")]
    NotFound(String),

    /// Another commit landed between read and write.
    #[error("Version conflict for {user_id}: expected {expected}, found {found}")]
    VersionConflict {
        user_id: String,
        expected: u64,
        found: u64,
    },

    /// Raw overwrite attempted without debug mode.
    #[error("Debug operations are disabled")]
    DebugDisabled,
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
