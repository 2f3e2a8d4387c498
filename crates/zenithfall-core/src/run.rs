//! The per-user save state and its inventories

use crate::identity::{CatalystId, DefId, ItemId, MaterialId, UserId};
use crate::rng::GameRng;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of quota-governed actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Transmute,
    Craft,
    Explore,
    Gift,
}

impl ActionKind {
    /// Every action kind, in display order
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Transmute,
        ActionKind::Craft,
        ActionKind::Explore,
        ActionKind::Gift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Transmute => "transmute",
            ActionKind::Craft => "craft",
            ActionKind::Explore => "explore",
            ActionKind::Gift => "gift",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-action counters for the current local day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounters {
    counts: IndexMap<ActionKind, u32>,
    last_reset: Option<NaiveDate>,
}

impl DailyCounters {
    /// Count of successful actions of this kind today
    pub fn count(&self, kind: ActionKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Record one more successful action, returning the new count
    pub fn increment(&mut self, kind: ActionKind) -> u32 {
        let count = self.counts.entry(kind).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Overwrite a counter directly
    pub fn set_count(&mut self, kind: ActionKind, count: u32) {
        self.counts.insert(kind, count);
    }

    /// Day the counters were last zeroed
    pub fn last_reset(&self) -> Option<NaiveDate> {
        self.last_reset
    }

    /// Zero every counter and stamp the reset day
    pub fn reset(&mut self, today: NaiveDate) {
        self.counts.clear();
        self.last_reset = Some(today);
    }

    /// Reset if `today` differs from the last reset day; returns whether it did
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_reset == Some(today) {
            return false;
        }
        self.reset(today);
        true
    }
}

/// A crafting input produced by transmutation or exploration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub material_type: DefId,
    pub essence: DefId,
    pub quality: u8,
    /// Free text describing where the material came from
    pub source_hint: String,
    pub created_at: DateTime<Utc>,
}

/// A crafted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub recipe_id: DefId,
    pub name: String,
    pub quality: u8,
    /// Capability tags used by gifting and exploration
    pub tags: Vec<DefId>,
    /// Used up when it helps on an exploration
    pub consumable: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Check whether the item carries any of the given tags
    pub fn has_any_tag(&self, tags: &[DefId]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }
}

/// A catalyst instance obtained from dungeon drops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalyst {
    pub id: CatalystId,
    /// Catalog definition this instance was drawn from
    pub catalyst_id: DefId,
    pub obtained_at: DateTime<Utc>,
}

/// A user's persistent save state for one play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub user_id: UserId,
    /// Chosen companion race, fixed at creation
    pub race_id: DefId,
    pub companion_name: String,
    pub companion_affinity: u32,
    /// Relationship phase derived from affinity
    pub phase: u8,
    /// Region progression level; gates dungeons and recipes
    pub rank: u32,
    pub inventory_materials: IndexMap<MaterialId, Material>,
    pub inventory_items: IndexMap<ItemId, Item>,
    pub inventory_catalysts: IndexMap<CatalystId, Catalyst>,
    /// Items currently carried into dungeons (references into `inventory_items`)
    pub equipped: Vec<ItemId>,
    pub daily: DailyCounters,
    /// Highest cleared depth per dungeon
    pub exploration_progress: IndexMap<DefId, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub vanished: bool,
    pub has_revival_item: bool,
    pub rng_state: u64,
    pub next_serial: u64,
    /// Optimistic concurrency version, bumped by the store on every commit
    pub version: u64,
}

impl Run {
    /// Create a fresh run
    pub fn new(
        user_id: UserId,
        race_id: DefId,
        companion_name: impl Into<String>,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            race_id,
            companion_name: companion_name.into(),
            companion_affinity: 0,
            phase: 1,
            rank: 1,
            inventory_materials: IndexMap::new(),
            inventory_items: IndexMap::new(),
            inventory_catalysts: IndexMap::new(),
            equipped: Vec::new(),
            daily: DailyCounters::default(),
            exploration_progress: IndexMap::new(),
            created_at: now,
            updated_at: now,
            last_active: now,
            vanished: false,
            has_revival_item: false,
            rng_state: GameRng::new(seed).state(),
            next_serial: 1,
            version: 0,
        }
    }

    fn take_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    /// Allocate a fresh material ID
    pub fn new_material_id(&mut self) -> MaterialId {
        MaterialId::from_serial(self.take_serial())
    }

    /// Allocate a fresh item ID
    pub fn new_item_id(&mut self) -> ItemId {
        ItemId::from_serial(self.take_serial())
    }

    /// Allocate a fresh catalyst ID
    pub fn new_catalyst_id(&mut self) -> CatalystId {
        CatalystId::from_serial(self.take_serial())
    }

    /// The run's RNG at its stored state
    pub fn rng(&self) -> GameRng {
        GameRng::from_state(self.rng_state)
    }

    /// Persist an advanced RNG back into the run
    pub fn store_rng(&mut self, rng: &GameRng) {
        self.rng_state = rng.state();
    }

    /// Highest cleared depth for a dungeon
    pub fn progress(&self, dungeon_id: &DefId) -> u32 {
        self.exploration_progress
            .get(dungeon_id)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of cleared depths across every dungeon
    pub fn total_cleared_depth(&self) -> u32 {
        self.exploration_progress.values().sum()
    }

    pub fn is_equipped(&self, item_id: &ItemId) -> bool {
        self.equipped.contains(item_id)
    }

    /// Equipped items in equip order
    pub fn equipped_items(&self) -> impl Iterator<Item = &Item> {
        self.equipped
            .iter()
            .filter_map(|id| self.inventory_items.get(id))
    }

    /// Remove an item from the inventory, unequipping it if needed
    pub fn remove_item(&mut self, item_id: &ItemId) -> Option<Item> {
        self.equipped.retain(|id| id != item_id);
        self.inventory_items.shift_remove(item_id)
    }

    /// Record activity at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.last_active = now;
    }
}
