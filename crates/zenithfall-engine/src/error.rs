//! Error types for zenithfall-engine
//!
//! Per-request errors abort only the current operation; nothing is committed.
//! [`Error::CatalogIntegrity`] and [`Error::Config`] only occur at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zenithfall_core::{ActionKind, CatalystId, DefId, ItemId, MaterialId};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad `start_run` payload for a run that does not exist yet
    #[error("invalid run init: {0}")]
    InvalidInit(String),

    #[error("invalid classification: {0}")]
    InvalidClassification(String),

    #[error("dungeon {dungeon} has no style {style}")]
    InvalidStyle { dungeon: DefId, style: DefId },

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no recipe matches the supplied materials")]
    NoMatchingRecipe,

    #[error("dungeon {dungeon} needs rank {tier}, run is rank {rank}")]
    DungeonLocked { dungeon: DefId, tier: u32, rank: u32 },

    #[error("unknown material: {0}")]
    UnknownMaterial(MaterialId),

    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("unknown catalyst: {0}")]
    UnknownCatalyst(CatalystId),

    #[error("{inventory} inventory is full ({cap})")]
    InventoryFull { inventory: &'static str, cap: usize },

    #[error("at most {max} items can be equipped")]
    EquipmentFull { max: usize },

    #[error("the companion has vanished")]
    CompanionVanished,

    #[error("daily {action} limit of {limit} reached")]
    DailyLimitExceeded { action: ActionKind, limit: u32 },

    #[error("debug operations are disabled")]
    DebugDisabled,

    #[error("gave up on {user_id} after {attempts} conflicting commits")]
    Contention { user_id: String, attempts: u32 },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("catalog integrity: {0}")]
    CatalogIntegrity(#[from] zenithfall_catalog::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<zenithfall_db::Error> for Error {
    fn from(err: zenithfall_db::Error) -> Self {
        match err {
            zenithfall_db::Error::NotFound(user) => Error::NotFound(format!("run for {}", user)),
            zenithfall_db::Error::DebugDisabled => Error::DebugDisabled,
            other => Error::Storage(other.to_string()),
        }
    }
}

impl From<zenithfall_core::Error> for Error {
    fn from(err: zenithfall_core::Error) -> Self {
        match err {
            zenithfall_core::Error::InvalidIdentifier(_) => Error::MalformedPayload(err.to_string()),
            zenithfall_core::Error::InvalidUtcOffset(_) => Error::Config(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedPayload(err.to_string())
    }
}

/// Transport-level classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidInit,
    InvalidClassification,
    InvalidStyle,
    MalformedPayload,
    NoMatchingRecipe,
    DungeonLocked,
    UnknownMaterial,
    UnknownItem,
    UnknownCatalyst,
    InventoryFull,
    EquipmentFull,
    CompanionVanished,
    DailyLimitExceeded,
    DebugDisabled,
    Contention,
    Storage,
    CatalogIntegrity,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidInit(_) => ErrorKind::InvalidInit,
            Error::InvalidClassification(_) => ErrorKind::InvalidClassification,
            Error::InvalidStyle { .. } => ErrorKind::InvalidStyle,
            Error::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Error::NoMatchingRecipe => ErrorKind::NoMatchingRecipe,
            Error::DungeonLocked { .. } => ErrorKind::DungeonLocked,
            Error::UnknownMaterial(_) => ErrorKind::UnknownMaterial,
            Error::UnknownItem(_) => ErrorKind::UnknownItem,
            Error::UnknownCatalyst(_) => ErrorKind::UnknownCatalyst,
            Error::InventoryFull { .. } => ErrorKind::InventoryFull,
            Error::EquipmentFull { .. } => ErrorKind::EquipmentFull,
            Error::CompanionVanished => ErrorKind::CompanionVanished,
            Error::DailyLimitExceeded { .. } => ErrorKind::DailyLimitExceeded,
            Error::DebugDisabled => ErrorKind::DebugDisabled,
            Error::Contention { .. } => ErrorKind::Contention,
            Error::Storage(_) => ErrorKind::Storage,
            Error::CatalogIntegrity(_) => ErrorKind::CatalogIntegrity,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// Serializable failure handed back to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure::from(&err)
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
