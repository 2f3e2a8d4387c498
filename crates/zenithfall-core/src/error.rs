//! Error types for zenithfall-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid UTC offset: {0} seconds")]
    InvalidUtcOffset(i32),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
