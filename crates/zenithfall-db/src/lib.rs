//! Zenithfall DB - Run state store using native_db
//!
//! Provides persistent storage for one `Run` record per user, with:
//! - Idempotent get-or-create
//! - Compare-and-swap commits on the run's version
//! - A debug-gated raw overwrite

mod error;
mod models;
mod store;

pub use error::{Error, Result};
pub use store::Store;
