//! Serializable results handed back to callers

use crate::resolve::craft::Crafted;
use crate::resolve::explore::Explored;
use crate::resolve::gift::Gifted;
use crate::resolve::transmute::Transmuted;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zenithfall_catalog::SlotDef;
use zenithfall_core::{ActionKind, Catalyst, DefId, Item, ItemId, Material, Run, UserId};

/// Quota usage for one action kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub action: ActionKind,
    pub used: u32,
    /// `None` when debug mode lifts the limit
    pub remaining: Option<u32>,
}

/// Player-facing view of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub user_id: UserId,
    pub race_id: DefId,
    pub companion_name: String,
    pub companion_affinity: u32,
    pub phase: u8,
    pub rank: u32,
    pub rank_name: Option<String>,
    pub vanished: bool,
    pub materials: Vec<Material>,
    pub items: Vec<Item>,
    pub catalysts: Vec<Catalyst>,
    pub equipped: Vec<ItemId>,
    pub exploration_progress: IndexMap<DefId, u32>,
    pub quotas: Vec<Quota>,
}

/// Result of `start_run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartedRun {
    /// False when an existing run was loaded instead
    pub created: bool,
    pub status: RunStatus,
}

/// A dungeon the run may enter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonSummary {
    pub id: DefId,
    pub name: String,
    pub region: DefId,
    pub tier: u32,
    pub max_depth: u32,
    pub progress: u32,
    pub styles: Vec<DefId>,
    pub risk_tags: Vec<DefId>,
}

/// A catalog recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: DefId,
    pub name: String,
    pub description: String,
    pub rank: u32,
    pub slots: Vec<SlotDef>,
    pub catalyst: Option<DefId>,
    pub tags: Vec<DefId>,
    pub quality_range: (u8, u8),
}

/// Successful result of any operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Started(StartedRun),
    Transmuted(Transmuted),
    Crafted(Crafted),
    Explored(Explored),
    Gifted(Gifted),
    Equipment(Vec<ItemId>),
    Status(RunStatus),
    Dungeons(Vec<DungeonSummary>),
    Recipes(Vec<RecipeSummary>),
    State(Box<Run>),
}
