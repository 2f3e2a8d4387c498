//! Zenithfall Catalog - RON loader and reference table schemas
//!
//! Loads the four content tables from RON files:
//! - Material schema (material types, essences, quality bounds)
//! - Recipes and catalysts
//! - Dungeons, exploration rules and rank requirements
//! - Races (companions) with affinity curves and gift tables
//!
//! A [`Catalog`] is only handed out after every cross-reference resolves;
//! it is immutable for the rest of the process.

mod catalog;
mod error;
mod loader;
mod schema;
mod validate;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use loader::Loader;
pub use schema::dungeon::{
    DropDef, DungeonDef, DungeonFile, ExplorationRules, OutcomeDef, OutcomeTier, RankRequirement,
    RewardDef,
};
pub use schema::material::{EssenceDef, MaterialSchema, MaterialTypeDef, QualityBounds, SchemaFile};
pub use schema::race::{AffinityCurve, RaceDef, RaceFile};
pub use schema::recipe::{CatalystDef, OutputDef, RecipeDef, RecipeFile, SlotDef};
