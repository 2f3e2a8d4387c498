//! Error types for zenithfall-catalog

use thiserror::Error;

/// Catalog loading error type
///
/// Every variant is fatal at startup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Missing content table: {0}")]
    MissingTable(&'static str),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),

    #[error("Unresolved reference in {owner}: {reference}")]
    UnresolvedReference { owner: String, reference: String },
}

impl Error {
    pub(crate) fn unresolved(owner: impl Into<String>, reference: impl Into<String>) -> Self {
        Error::UnresolvedReference {
            owner: owner.into(),
            reference: reference.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
