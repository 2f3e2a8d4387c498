//! Database models for persistent storage.

mod run;

pub use run::*;
