//! Dungeon exploration: outcome roll, drops, progress and rank

use super::ResolveContext;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use zenithfall_catalog::{DungeonDef, OutcomeTier, RewardDef};
use zenithfall_core::{Catalyst, DefId, ItemId, Material, RandomSource, Run};

/// Where to go and how to approach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expedition {
    pub dungeon_id: DefId,
    pub style: DefId,
}

/// Something brought back from a dungeon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reward {
    Material(Material),
    Catalyst(Catalyst),
}

/// Result of an exploration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explored {
    pub dungeon_id: DefId,
    pub tier: OutcomeTier,
    pub rewards: Vec<Reward>,
    /// Depth gained in this dungeon (0 or 1)
    pub progress_delta: u32,
    pub progress: u32,
    pub affinity_delta: u32,
    /// New rank, if this run ranked up
    pub rank_up: Option<u32>,
    /// Consumable equipped items used up against the dungeon's risks; empty on a setback
    pub consumed_items: Vec<ItemId>,
}

/// Roll one exploration of a dungeon
pub fn explore(
    ctx: &ResolveContext<'_>,
    run: &mut Run,
    expedition: Expedition,
    rng: &mut impl RandomSource,
) -> Result<Explored> {
    let catalog = ctx.catalog;
    let dungeon = catalog
        .dungeon(&expedition.dungeon_id)
        .ok_or_else(|| Error::NotFound(format!("dungeon {}", expedition.dungeon_id)))?;
    if !dungeon.is_unlocked_at(run.rank) {
        return Err(Error::DungeonLocked {
            dungeon: dungeon.id.clone(),
            tier: dungeon.tier,
            rank: run.rank,
        });
    }
    let outcomes = dungeon
        .outcomes(&expedition.style)
        .ok_or_else(|| Error::InvalidStyle {
            dungeon: dungeon.id.clone(),
            style: expedition.style.clone(),
        })?;
    if run.vanished {
        return Err(Error::CompanionVanished);
    }
    let race = catalog
        .race(&run.race_id)
        .ok_or_else(|| Error::NotFound(format!("race {}", run.race_id)))?;

    let matching: Vec<(ItemId, bool)> = run
        .equipped_items()
        .filter(|item| item.has_any_tag(&dungeon.risk_tags))
        .map(|item| (item.id.clone(), item.consumable))
        .collect();

    let rules = &catalog.rules;
    let affinity_bonus =
        f64::from(run.companion_affinity) / f64::from(race.growth.max) * rules.affinity_weight;
    let equipment_bonus =
        (matching.len() as f64 * rules.per_matching_item).min(rules.equipment_cap);
    let stat_bonus = (f64::from(race.stat_total()) * rules.per_stat_point)
        .clamp(-rules.stat_cap, rules.stat_cap);
    let scale = 1.0 + affinity_bonus + equipment_bonus + stat_bonus;

    let weights: Vec<f64> = outcomes
        .iter()
        .map(|o| if o.tier.advances() { o.weight * scale } else { o.weight })
        .collect();
    let outcome = rng
        .weighted_index(&weights)
        .and_then(|i| outcomes.get(i))
        .ok_or_else(|| Error::InvalidStyle {
            dungeon: dungeon.id.clone(),
            style: expedition.style.clone(),
        })?;
    tracing::debug!(
        dungeon = %dungeon.id,
        style = %expedition.style,
        scale,
        tier = ?outcome.tier,
        "exploration rolled"
    );

    let (low, high) = outcome.rewards;
    let count = rng.range_i64(i64::from(low), i64::from(high));
    let mut rewards = Vec::new();
    for _ in 0..count {
        if let Some(reward) = roll_drop(ctx, run, dungeon, rng)? {
            rewards.push(reward);
        }
    }

    let mut progress_delta = 0;
    let mut affinity_delta = 0;
    let mut rank_up = None;
    if outcome.tier.advances() {
        let before = run.progress(&dungeon.id);
        let after = (before + 1).min(dungeon.max_depth);
        progress_delta = after - before;
        run.exploration_progress.insert(dungeon.id.clone(), after);

        // Affinity never drops, even when stored above the curve maximum
        let affinity = run
            .companion_affinity
            .saturating_add(rules.success_affinity)
            .min(race.growth.max)
            .max(run.companion_affinity);
        affinity_delta = affinity.saturating_sub(run.companion_affinity);
        run.companion_affinity = affinity;
        run.phase = race.growth.phase_for(affinity);

        let rank = catalog.rank_for_depth(run.total_cleared_depth());
        if rank > run.rank {
            run.rank = rank;
            rank_up = Some(rank);
        }
    }

    // A setback leaves the inventory untouched
    let consumed_items: Vec<ItemId> = if outcome.tier.advances() {
        matching
            .into_iter()
            .filter(|(_, consumable)| *consumable)
            .map(|(id, _)| id)
            .collect()
    } else {
        Vec::new()
    };
    for id in &consumed_items {
        run.remove_item(id);
    }

    Ok(Explored {
        dungeon_id: dungeon.id.clone(),
        tier: outcome.tier,
        rewards,
        progress_delta,
        progress: run.progress(&dungeon.id),
        affinity_delta,
        rank_up,
        consumed_items,
    })
}

fn roll_drop(
    ctx: &ResolveContext<'_>,
    run: &mut Run,
    dungeon: &DungeonDef,
    rng: &mut impl RandomSource,
) -> Result<Option<Reward>> {
    let weights: Vec<f64> = dungeon.drops.iter().map(|d| d.weight).collect();
    let Some(drop) = rng.weighted_index(&weights).and_then(|i| dungeon.drops.get(i)) else {
        return Ok(None);
    };

    let reward = match &drop.reward {
        RewardDef::Material {
            material,
            essence,
            quality: (low, high),
        } => {
            ctx.ensure_material_room(run, 1)?;
            let quality = rng.range_i64(i64::from(*low), i64::from(*high));
            let material = Material {
                id: run.new_material_id(),
                material_type: material.clone(),
                essence: essence.clone(),
                quality: ctx.catalog.schema.quality.clamp(quality),
                source_hint: format!("found in {}", dungeon.name),
                created_at: ctx.now,
            };
            run.inventory_materials
                .insert(material.id.clone(), material.clone());
            Reward::Material(material)
        }
        RewardDef::Catalyst(catalyst_id) => {
            ctx.ensure_catalyst_room(run, 1)?;
            let catalyst = Catalyst {
                id: run.new_catalyst_id(),
                catalyst_id: catalyst_id.clone(),
                obtained_at: ctx.now,
            };
            run.inventory_catalysts
                .insert(catalyst.id.clone(), catalyst.clone());
            Reward::Catalyst(catalyst)
        }
    };
    Ok(Some(reward))
}
