//! Zenithfall Engine - rules engine for the photo alchemy progression loop
//!
//! A player's photos are transmuted into materials, materials are crafted
//! into items, items help in dungeons or are gifted to a companion. This
//! crate wires the pieces together:
//!
//! - [`Engine`]: operation entry points, quota handling and commit retries
//! - [`resolve`]: the four mutation algorithms plus equipment
//! - [`Governor`]: daily limits in a fixed local time zone and the debug gate
//! - [`Request`] / [`Response`]: the typed wire surface
//!
//! ## Concurrency
//!
//! Runs are committed with a compare-and-swap on their version. Two
//! concurrent operations on the same run cannot both land: the loser re-reads
//! the winner's state and re-validates from scratch.

mod config;
mod engine;
mod error;
mod governor;
mod request;
pub mod resolve;
mod response;

pub use config::{DailyLimits, EngineConfig, InventoryCaps, ENV_DATA_DIR, ENV_DEBUG};
pub use engine::Engine;
pub use error::{Error, ErrorKind, Failure, Result};
pub use governor::Governor;
pub use request::{Request, RunPatch};
pub use resolve::craft::Crafted;
pub use resolve::explore::{Explored, Reward};
pub use resolve::gift::Gifted;
pub use resolve::transmute::{Observation, Transmuted};
pub use response::{DungeonSummary, Quota, RecipeSummary, Response, RunStatus, StartedRun};
