//! Zenithfall Core - Run state model for the photo alchemy rules engine
//!
//! This crate provides the data types every other zenithfall crate builds on:
//! - Identifiers for users, catalog definitions and generated inventory entries
//! - The `Run` save-state record and its inventories
//! - Per-action daily counters
//! - A wall clock abstraction with local-day computation
//! - A deterministic RNG behind the injectable `RandomSource` trait
//!
//! Nothing in this crate performs I/O. Resolvers in `zenithfall-engine`
//! operate on checked-out copies of a [`Run`] and hand back replacements.

mod error;
mod identity;
mod rng;
mod run;
pub mod time;

pub use error::{Error, Result};
pub use identity::{CatalystId, DefId, ItemId, MaterialId, UserId};
pub use rng::{GameRng, RandomSource};
pub use run::{ActionKind, Catalyst, DailyCounters, Item, Material, Run};
pub use time::{Clock, FixedClock, SystemClock};
