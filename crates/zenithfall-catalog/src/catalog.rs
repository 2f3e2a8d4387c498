//! The loaded, validated reference tables

use crate::schema::dungeon::{DungeonDef, ExplorationRules, RankRequirement};
use crate::schema::material::MaterialSchema;
use crate::schema::race::RaceDef;
use crate::schema::recipe::{CatalystDef, RecipeDef};
use indexmap::IndexMap;
use zenithfall_core::DefId;

/// Immutable reference data shared by every run
///
/// Maps keep file declaration order; recipe matching relies on it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub schema: MaterialSchema,
    pub recipes: IndexMap<DefId, RecipeDef>,
    pub catalysts: IndexMap<DefId, CatalystDef>,
    pub dungeons: IndexMap<DefId, DungeonDef>,
    pub rules: ExplorationRules,
    /// Sorted by ascending rank
    pub rank_requirements: Vec<RankRequirement>,
    pub races: IndexMap<DefId, RaceDef>,
}

impl Catalog {
    pub fn recipe(&self, id: &DefId) -> Option<&RecipeDef> {
        self.recipes.get(id)
    }

    pub fn catalyst(&self, id: &DefId) -> Option<&CatalystDef> {
        self.catalysts.get(id)
    }

    pub fn dungeon(&self, id: &DefId) -> Option<&DungeonDef> {
        self.dungeons.get(id)
    }

    pub fn race(&self, id: &DefId) -> Option<&RaceDef> {
        self.races.get(id)
    }

    /// Recipes craftable at a rank, in catalog order
    pub fn recipes_for_rank(&self, rank: u32) -> impl Iterator<Item = &RecipeDef> {
        self.recipes.values().filter(move |r| r.rank <= rank)
    }

    /// Dungeons enterable at a rank, in catalog order
    pub fn dungeons_for_rank(&self, rank: u32) -> impl Iterator<Item = &DungeonDef> {
        self.dungeons
            .values()
            .filter(move |d| d.is_unlocked_at(rank))
    }

    /// Highest rank whose depth requirement is met (at least 1)
    pub fn rank_for_depth(&self, cleared_depth: u32) -> u32 {
        self.rank_requirements
            .iter()
            .filter(|req| cleared_depth >= req.min_cleared_depth)
            .map(|req| req.rank)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Display name of a rank
    pub fn rank_name(&self, rank: u32) -> Option<&str> {
        self.rank_requirements
            .iter()
            .find(|req| req.rank == rank)
            .map(|req| req.name.as_str())
    }
}
