//! Cross-table integrity checks run before a catalog is handed out

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::schema::dungeon::{DungeonDef, ExplorationRules, RewardDef};
use crate::schema::material::QualityBounds;
use crate::schema::race::RaceDef;
use crate::schema::recipe::RecipeDef;

pub(crate) fn check(catalog: &Catalog) -> Result<()> {
    check_quality(&catalog.schema.quality)?;
    for catalyst in catalog.catalysts.values() {
        let owner = format!("catalyst {}", catalyst.id);
        if !catalog.schema.has_material(&catalyst.material) {
            return Err(Error::unresolved(owner, catalyst.material.as_str()));
        }
        if !catalog.schema.has_essence(&catalyst.essence) {
            return Err(Error::unresolved(owner, catalyst.essence.as_str()));
        }
    }
    for recipe in catalog.recipes.values() {
        check_recipe(catalog, recipe)?;
    }
    for dungeon in catalog.dungeons.values() {
        check_dungeon(catalog, dungeon)?;
    }
    check_rules(&catalog.rules)?;
    check_ranks(catalog)?;
    for race in catalog.races.values() {
        check_race(race)?;
    }
    Ok(())
}

fn check_quality(quality: &QualityBounds) -> Result<()> {
    if quality.min == 0 || quality.min > quality.max {
        return Err(Error::InvalidSchema(format!(
            "quality bounds {}..={} are empty or start at zero",
            quality.min, quality.max
        )));
    }
    if !(0.0..=1.0).contains(&quality.nudge_chance) {
        return Err(Error::InvalidSchema(format!(
            "nudge_chance {} is not a probability",
            quality.nudge_chance
        )));
    }
    Ok(())
}

fn check_recipe(catalog: &Catalog, recipe: &RecipeDef) -> Result<()> {
    let owner = format!("recipe {}", recipe.id);
    let bounds = &catalog.schema.quality;

    if recipe.slots.is_empty() {
        return Err(Error::InvalidSchema(format!("{} has no slots", owner)));
    }
    for slot in &recipe.slots {
        if let Some(material) = &slot.material {
            if !catalog.schema.has_material(material) {
                return Err(Error::unresolved(&owner, material.as_str()));
            }
        }
        if let Some(essence) = &slot.essence {
            if !catalog.schema.has_essence(essence) {
                return Err(Error::unresolved(&owner, essence.as_str()));
            }
        }
        if !bounds.contains(i64::from(slot.min_quality)) {
            return Err(Error::InvalidSchema(format!(
                "{} slot min_quality {} is out of bounds",
                owner, slot.min_quality
            )));
        }
    }

    let (low, high) = recipe.output.quality_range;
    if low > high || !bounds.contains(i64::from(low)) || !bounds.contains(i64::from(high)) {
        return Err(Error::InvalidSchema(format!(
            "{} output quality range ({}, {}) is invalid",
            owner, low, high
        )));
    }

    if let Some(catalyst) = &recipe.catalyst {
        if catalog.catalyst(catalyst).is_none() {
            return Err(Error::unresolved(owner, catalyst.as_str()));
        }
    }
    if recipe.rank == 0 {
        return Err(Error::InvalidSchema(format!("{} requires rank 0", owner)));
    }
    Ok(())
}

fn check_dungeon(catalog: &Catalog, dungeon: &DungeonDef) -> Result<()> {
    let owner = format!("dungeon {}", dungeon.id);

    if dungeon.tier == 0 || dungeon.max_depth == 0 {
        return Err(Error::InvalidSchema(format!(
            "{} needs a tier and max_depth of at least 1",
            owner
        )));
    }
    if dungeon.styles.is_empty() {
        return Err(Error::InvalidSchema(format!("{} has no styles", owner)));
    }

    let mut grants_rewards = false;
    for (style, outcomes) in &dungeon.styles {
        if outcomes.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "{} style {} has no outcomes",
                owner, style
            )));
        }
        for outcome in outcomes {
            if !outcome.weight.is_finite() || outcome.weight <= 0.0 {
                return Err(Error::InvalidSchema(format!(
                    "{} style {} has a non-positive weight",
                    owner, style
                )));
            }
            let (low, high) = outcome.rewards;
            if low > high {
                return Err(Error::InvalidSchema(format!(
                    "{} style {} reward range ({}, {}) is inverted",
                    owner, style, low, high
                )));
            }
            grants_rewards |= high > 0;
        }
    }

    if grants_rewards && dungeon.drops.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "{} grants rewards but has no drop table",
            owner
        )));
    }

    let bounds = &catalog.schema.quality;
    for drop in &dungeon.drops {
        if !drop.weight.is_finite() || drop.weight <= 0.0 {
            return Err(Error::InvalidSchema(format!(
                "{} has a drop with a non-positive weight",
                owner
            )));
        }
        match &drop.reward {
            RewardDef::Material {
                material,
                essence,
                quality: (low, high),
            } => {
                if !catalog.schema.has_material(material) {
                    return Err(Error::unresolved(&owner, material.as_str()));
                }
                if !catalog.schema.has_essence(essence) {
                    return Err(Error::unresolved(&owner, essence.as_str()));
                }
                if low > high
                    || !bounds.contains(i64::from(*low))
                    || !bounds.contains(i64::from(*high))
                {
                    return Err(Error::InvalidSchema(format!(
                        "{} drop quality range ({}, {}) is invalid",
                        owner, low, high
                    )));
                }
            }
            RewardDef::Catalyst(catalyst) => {
                if catalog.catalyst(catalyst).is_none() {
                    return Err(Error::unresolved(&owner, catalyst.as_str()));
                }
            }
        }
    }
    Ok(())
}

fn check_rules(rules: &ExplorationRules) -> Result<()> {
    for (name, value) in [
        ("affinity_weight", rules.affinity_weight),
        ("per_matching_item", rules.per_matching_item),
        ("equipment_cap", rules.equipment_cap),
        ("per_stat_point", rules.per_stat_point),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidSchema(format!(
                "exploration rule {} must be a non-negative number",
                name
            )));
        }
    }
    // A penalty of 1.0 or more would zero out every success weight
    if !(0.0..1.0).contains(&rules.stat_cap) {
        return Err(Error::InvalidSchema(format!(
            "exploration rule stat_cap {} must be within 0..1",
            rules.stat_cap
        )));
    }
    Ok(())
}

fn check_ranks(catalog: &Catalog) -> Result<()> {
    let mut previous_rank = 1;
    let mut previous_depth = 0;
    for req in &catalog.rank_requirements {
        if req.rank <= previous_rank || req.min_cleared_depth < previous_depth {
            return Err(Error::InvalidSchema(format!(
                "rank requirement {} ({}) is out of order",
                req.rank, req.name
            )));
        }
        previous_rank = req.rank;
        previous_depth = req.min_cleared_depth;
    }
    Ok(())
}

fn check_race(race: &RaceDef) -> Result<()> {
    let growth = &race.growth;
    if growth.max == 0 || growth.half_point == 0 || growth.per_phase == 0 || growth.max_phase == 0 {
        return Err(Error::InvalidSchema(format!(
            "race {} has a degenerate affinity curve",
            race.id
        )));
    }
    if growth.min_delta == 0 || growth.min_delta > growth.max {
        return Err(Error::InvalidSchema(format!(
            "race {} min_delta must be within 1..={}",
            race.id, growth.max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::loader::tests::{loader_with, DUNGEONS, MATERIALS, RACES, RECIPES};

    #[test]
    fn test_unknown_essence_in_recipe() {
        let recipes = RECIPES.replace("essence: \"control\"", "essence: \"void\"");
        let result = loader_with(MATERIALS, &recipes, DUNGEONS, RACES).finish();
        assert!(matches!(
            result,
            Err(Error::UnresolvedReference { owner, reference })
                if owner == "recipe iron_key" && reference == "void"
        ));
    }

    #[test]
    fn test_unknown_catalyst_in_drop() {
        let dungeons = DUNGEONS.replace("Catalyst(\"ember_core\")", "Catalyst(\"ghost\")");
        let result = loader_with(MATERIALS, RECIPES, &dungeons, RACES).finish();
        assert!(matches!(result, Err(Error::UnresolvedReference { .. })));
    }

    #[test]
    fn test_output_range_outside_bounds() {
        let recipes = RECIPES.replace("quality_range: (1, 5)", "quality_range: (1, 9)");
        let result = loader_with(MATERIALS, &recipes, DUNGEONS, RACES).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_zero_weight_outcome() {
        let dungeons = DUNGEONS.replace("weight: 1.0), (tier", "weight: 0.0), (tier");
        let result = loader_with(MATERIALS, RECIPES, &dungeons, RACES).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_rewards_without_drop_table() {
        let dungeons = DUNGEONS.replace(
            "drops: [(weight: 1.0, reward: Catalyst(\"ember_core\"))],",
            "",
        );
        let result = loader_with(MATERIALS, RECIPES, &dungeons, RACES).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(msg)) if msg.contains("drop table")));
    }

    #[test]
    fn test_rank_requirements_out_of_order() {
        let dungeons = DUNGEONS.replace(
            "rank_requirements: [(rank: 2, name: \"Wayfarer\", min_cleared_depth: 3)]",
            "rank_requirements: [(rank: 3, name: \"Seeker\", min_cleared_depth: 6), (rank: 2, name: \"Wayfarer\", min_cleared_depth: 3)]",
        );
        let result = loader_with(MATERIALS, RECIPES, &dungeons, RACES).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_stat_cap_must_stay_below_one() {
        let dungeons = DUNGEONS.replace(
            "rank_requirements:",
            "rules: (stat_cap: 1.0),\n        rank_requirements:",
        );
        let result = loader_with(MATERIALS, RECIPES, &dungeons, RACES).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(msg)) if msg.contains("stat_cap")));
    }

    #[test]
    fn test_degenerate_affinity_curve() {
        let races = RACES.replace("half_point: 50", "half_point: 0");
        let result = loader_with(MATERIALS, RECIPES, DUNGEONS, &races).finish();
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }
}
