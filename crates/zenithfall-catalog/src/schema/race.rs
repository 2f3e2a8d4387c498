//! Race (companion) definition schema

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zenithfall_core::DefId;

/// How a companion's affinity grows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityCurve {
    /// Affinity ceiling
    pub max: u32,
    /// Affinity at which gift gains are halved
    pub half_point: u32,
    /// Smallest gain any gift can produce
    pub min_delta: u32,
    /// Affinity needed per relationship phase
    pub per_phase: u32,
    #[serde(default = "default_max_phase")]
    pub max_phase: u8,
}

fn default_max_phase() -> u8 {
    5
}

impl AffinityCurve {
    /// Relationship phase for an affinity value, starting at 1
    pub fn phase_for(&self, affinity: u32) -> u8 {
        let steps = affinity / self.per_phase.max(1);
        let phase = 1 + steps.min(u32::from(u8::MAX - 1));
        (phase as u8).min(self.max_phase)
    }
}

/// Definition of a playable companion race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Companion name used when the player does not pick one
    pub default_name: String,
    /// Base stat offsets; their sum shifts exploration odds
    #[serde(default)]
    pub stat_modifiers: IndexMap<DefId, i32>,
    pub growth: AffinityCurve,
    /// Base gift bonus per item tag
    #[serde(default)]
    pub gift_bonus: IndexMap<DefId, u32>,
    /// Base bonus for items with no listed tag
    pub default_gift_bonus: u32,
}

impl RaceDef {
    /// Base gift bonus for a set of item tags, and whether any tag is a favourite
    pub fn gift_base(&self, tags: &[DefId]) -> (u32, bool) {
        tags.iter()
            .filter_map(|tag| self.gift_bonus.get(tag).copied())
            .max()
            .map_or((self.default_gift_bonus, false), |bonus| (bonus, true))
    }

    /// Net of all stat modifiers
    pub fn stat_total(&self) -> i32 {
        self.stat_modifiers.values().sum()
    }
}

/// On-disk layout of `races.ron`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceFile {
    pub races: Vec<RaceDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn felina() -> RaceDef {
        let ron_str = r#"
        (
            id: "felina",
            name: "Felina",
            default_name: "Mike",
            stat_modifiers: {"agility": 2},
            growth: (max: 100, half_point: 50, min_delta: 1, per_phase: 20),
            gift_bonus: {"shiny": 8, "tool": 5},
            default_gift_bonus: 3,
        )
        "#;
        ron::from_str(ron_str).unwrap()
    }

    #[test]
    fn test_gift_base_picks_best_tag() {
        let race = felina();
        assert_eq!(
            race.gift_base(&[DefId::new("tool"), DefId::new("shiny")]),
            (8, true)
        );
        assert_eq!(race.gift_base(&[DefId::new("rock")]), (3, false));
        assert_eq!(race.gift_base(&[]), (3, false));
    }

    #[test]
    fn test_stat_total() {
        let mut race = felina();
        assert_eq!(race.stat_total(), 2);
        race.stat_modifiers.insert(DefId::new("strength"), -5);
        assert_eq!(race.stat_total(), -3);
    }

    #[test]
    fn test_phase_for() {
        let curve = felina().growth;
        assert_eq!(curve.phase_for(0), 1);
        assert_eq!(curve.phase_for(19), 1);
        assert_eq!(curve.phase_for(20), 2);
        assert_eq!(curve.phase_for(100), 5);
    }
}
