//! Dungeon, exploration rule and rank progression schema

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zenithfall_core::DefId;

/// How well an exploration went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTier {
    /// Partial failure: the party retreats without advancing
    Setback,
    Cleared,
    Triumph,
}

impl OutcomeTier {
    /// Whether this tier advances dungeon progress
    pub fn advances(&self) -> bool {
        !matches!(self, OutcomeTier::Setback)
    }
}

/// One weighted entry of a style's outcome table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeDef {
    pub tier: OutcomeTier,
    pub weight: f64,
    /// Inclusive (min, max) number of drop table rolls
    #[serde(default)]
    pub rewards: (u32, u32),
}

/// What a drop table roll grants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RewardDef {
    Material {
        material: DefId,
        essence: DefId,
        /// Inclusive quality range
        quality: (u8, u8),
    },
    Catalyst(DefId),
}

/// One weighted entry of a dungeon's drop table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropDef {
    pub weight: f64,
    pub reward: RewardDef,
}

/// Definition of an explorable dungeon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub region: DefId,
    /// Difficulty tier; a run needs at least this rank to enter
    pub tier: u32,
    pub max_depth: u32,
    /// Item tags that help against this dungeon's dangers
    #[serde(default)]
    pub risk_tags: Vec<DefId>,
    /// Outcome table per approach style
    pub styles: IndexMap<DefId, Vec<OutcomeDef>>,
    #[serde(default)]
    pub drops: Vec<DropDef>,
}

impl DungeonDef {
    pub fn outcomes(&self, style: &DefId) -> Option<&[OutcomeDef]> {
        self.styles.get(style).map(Vec::as_slice)
    }

    pub fn is_unlocked_at(&self, rank: u32) -> bool {
        self.tier <= rank
    }
}

/// Rank reached once enough total depth has been cleared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequirement {
    pub rank: u32,
    pub name: String,
    pub min_cleared_depth: u32,
}

/// Tuning knobs for the exploration resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationRules {
    /// Success weight bonus at maximum affinity
    #[serde(default = "default_affinity_weight")]
    pub affinity_weight: f64,
    /// Success weight bonus per equipped item matching a risk tag
    #[serde(default = "default_per_matching_item")]
    pub per_matching_item: f64,
    /// Cap on the total equipment bonus
    #[serde(default = "default_equipment_cap")]
    pub equipment_cap: f64,
    /// Affinity gained on a successful exploration
    #[serde(default = "default_success_affinity")]
    pub success_affinity: u32,
    #[serde(default = "default_max_equipped")]
    pub max_equipped: usize,
    /// Success weight bonus per point of the race's net stat modifiers
    #[serde(default = "default_per_stat_point")]
    pub per_stat_point: f64,
    /// Cap on the stat bonus in either direction
    #[serde(default = "default_stat_cap")]
    pub stat_cap: f64,
}

fn default_affinity_weight() -> f64 {
    0.25
}

fn default_per_matching_item() -> f64 {
    0.15
}

fn default_equipment_cap() -> f64 {
    0.45
}

fn default_success_affinity() -> u32 {
    1
}

fn default_max_equipped() -> usize {
    3
}

fn default_per_stat_point() -> f64 {
    0.02
}

fn default_stat_cap() -> f64 {
    0.2
}

impl Default for ExplorationRules {
    fn default() -> Self {
        Self {
            affinity_weight: default_affinity_weight(),
            per_matching_item: default_per_matching_item(),
            equipment_cap: default_equipment_cap(),
            success_affinity: default_success_affinity(),
            max_equipped: default_max_equipped(),
            per_stat_point: default_per_stat_point(),
            stat_cap: default_stat_cap(),
        }
    }
}

/// On-disk layout of `dungeons.ron`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonFile {
    #[serde(default)]
    pub rules: ExplorationRules,
    #[serde(default)]
    pub rank_requirements: Vec<RankRequirement>,
    pub dungeons: Vec<DungeonDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dungeon_file_ron() {
        let ron_str = r#"
        (
            rank_requirements: [(rank: 2, name: "Wayfarer", min_cleared_depth: 3)],
            dungeons: [
                (
                    id: "old_mine",
                    name: "Old Mine",
                    region: "ashen_hills",
                    tier: 1,
                    max_depth: 3,
                    risk_tags: ["light"],
                    styles: {
                        "guard": [
                            (tier: setback, weight: 2.0),
                            (tier: cleared, weight: 6.0, rewards: (1, 2)),
                        ],
                    },
                    drops: [
                        (weight: 3.0, reward: Material(material: "metal", essence: "defense", quality: (1, 3))),
                        (weight: 1.0, reward: Catalyst("ember_core")),
                    ],
                ),
            ],
        )
        "#;

        let file: DungeonFile = ron::from_str(ron_str).unwrap();
        let dungeon = &file.dungeons[0];
        let guard = dungeon.outcomes(&DefId::new("guard")).unwrap();
        assert_eq!(guard[0].tier, OutcomeTier::Setback);
        assert_eq!(guard[0].rewards, (0, 0));
        assert!(guard[1].tier.advances());
        assert!(dungeon.outcomes(&DefId::new("scout")).is_none());
        assert_eq!(file.rules.max_equipped, 3);
        assert_eq!(file.rules.stat_cap, 0.2);
    }

    #[test]
    fn test_unlock_by_rank() {
        let dungeon = DungeonDef {
            id: DefId::new("spire"),
            name: "Spire".into(),
            description: String::new(),
            region: DefId::new("sky"),
            tier: 3,
            max_depth: 5,
            risk_tags: vec![],
            styles: IndexMap::new(),
            drops: vec![],
        };
        assert!(!dungeon.is_unlocked_at(2));
        assert!(dungeon.is_unlocked_at(3));
    }
}
