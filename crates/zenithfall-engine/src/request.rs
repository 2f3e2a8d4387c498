//! Typed request payloads decoded at the boundary
//!
//! Payloads arrive as JSON objects tagged by `op`:
//!
//! ```
//! use zenithfall_engine::Request;
//!
//! let req = Request::from_json(r#"{"op": "explore", "dungeon_id": "old_mine", "style": "guard"}"#).unwrap();
//! assert_eq!(req.op(), "explore");
//! assert!(Request::from_json(r#"{"op": "explore", "dungeon_id": "old_mine"}"#).is_err());
//! ```

use crate::error::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zenithfall_core::{ActionKind, CatalystId, DefId, ItemId, MaterialId, Run};

/// Every operation the engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Request {
    StartRun {
        race_id: DefId,
        #[serde(default)]
        partner_name: Option<String>,
    },
    TransmutePhoto {
        #[serde(default)]
        hint_text: Option<String>,
        detected_material: DefId,
        detected_essence: DefId,
        detected_quality: i64,
    },
    CraftItem {
        material_ids: Vec<MaterialId>,
        #[serde(default)]
        catalyst_id: Option<CatalystId>,
    },
    Explore {
        dungeon_id: DefId,
        style: DefId,
    },
    Gift {
        item_id: ItemId,
    },
    Equip {
        item_id: ItemId,
    },
    Unequip {
        item_id: ItemId,
    },
    // Field-less ops are empty structs so unknown fields are still rejected
    GetStatus {},
    GetAvailableDungeons {},
    GetRecipes {},
    ResetDaily {},
    SetState {
        patch: RunPatch,
    },
    GetState {},
}

impl Request {
    /// Decode a JSON payload; any shape error is a malformed payload
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode an already parsed JSON value
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(payload)?)
    }

    /// Operation name, as used in the `op` tag
    pub fn op(&self) -> &'static str {
        match self {
            Request::StartRun { .. } => "start_run",
            Request::TransmutePhoto { .. } => "transmute_photo",
            Request::CraftItem { .. } => "craft_item",
            Request::Explore { .. } => "explore",
            Request::Gift { .. } => "gift",
            Request::Equip { .. } => "equip",
            Request::Unequip { .. } => "unequip",
            Request::GetStatus {} => "get_status",
            Request::GetAvailableDungeons {} => "get_available_dungeons",
            Request::GetRecipes {} => "get_recipes",
            Request::ResetDaily {} => "reset_daily",
            Request::SetState { .. } => "set_state",
            Request::GetState {} => "get_state",
        }
    }
}

/// Debug-only partial overwrite of a run; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunPatch {
    pub companion_name: Option<String>,
    pub companion_affinity: Option<u32>,
    pub phase: Option<u8>,
    pub rank: Option<u32>,
    pub exploration_progress: Option<IndexMap<DefId, u32>>,
    pub daily_counts: Option<IndexMap<ActionKind, u32>>,
    pub last_active: Option<DateTime<Utc>>,
    pub vanished: Option<bool>,
    pub has_revival_item: Option<bool>,
}

impl RunPatch {
    /// Apply the patch without any validation
    pub fn apply(self, run: &mut Run) {
        if let Some(name) = self.companion_name {
            run.companion_name = name;
        }
        if let Some(affinity) = self.companion_affinity {
            run.companion_affinity = affinity;
        }
        if let Some(phase) = self.phase {
            run.phase = phase;
        }
        if let Some(rank) = self.rank {
            run.rank = rank;
        }
        if let Some(progress) = self.exploration_progress {
            run.exploration_progress = progress;
        }
        if let Some(counts) = self.daily_counts {
            for (kind, count) in counts {
                run.daily.set_count(kind, count);
            }
        }
        if let Some(at) = self.last_active {
            run.last_active = at;
        }
        if let Some(vanished) = self.vanished {
            run.vanished = vanished;
        }
        if let Some(has) = self.has_revival_item {
            run.has_revival_item = has;
        }
    }
}
