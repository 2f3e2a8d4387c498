//! Equipping items for exploration

use super::ResolveContext;
use crate::error::{Error, Result};
use zenithfall_core::{ItemId, Run};

/// Add an owned item to the equipped set; equipping twice is a no-op
pub fn equip(ctx: &ResolveContext<'_>, run: &mut Run, item_id: &ItemId) -> Result<()> {
    if !run.inventory_items.contains_key(item_id) {
        return Err(Error::UnknownItem(item_id.clone()));
    }
    if run.is_equipped(item_id) {
        return Ok(());
    }
    let max = ctx.catalog.rules.max_equipped;
    if run.equipped.len() >= max {
        return Err(Error::EquipmentFull { max });
    }
    run.equipped.push(item_id.clone());
    Ok(())
}

/// Remove an item from the equipped set
pub fn unequip(run: &mut Run, item_id: &ItemId) -> Result<()> {
    if !run.is_equipped(item_id) {
        return Err(Error::UnknownItem(item_id.clone()));
    }
    run.equipped.retain(|id| id != item_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::fixtures;
    use zenithfall_core::{DefId, Item};

    fn give_item(run: &mut Run) -> ItemId {
        let id = run.new_item_id();
        run.inventory_items.insert(
            id.clone(),
            Item {
                id: id.clone(),
                recipe_id: DefId::new("iron_key"),
                name: "Iron Key".into(),
                quality: 1,
                tags: vec![DefId::new("tool")],
                consumable: false,
                created_at: fixtures::now(),
            },
        );
        id
    }

    #[test]
    fn test_equip_up_to_max() {
        let catalog = fixtures::catalog();
        let ctx = ResolveContext { catalog: &catalog, caps: None, now: fixtures::now() };
        let mut run = fixtures::run();
        let a = give_item(&mut run);
        let b = give_item(&mut run);
        let c = give_item(&mut run);

        equip(&ctx, &mut run, &a).unwrap();
        equip(&ctx, &mut run, &a).unwrap();
        equip(&ctx, &mut run, &b).unwrap();
        assert_eq!(run.equipped, vec![a.clone(), b]);
        assert!(matches!(
            equip(&ctx, &mut run, &c),
            Err(Error::EquipmentFull { max: 2 })
        ));

        unequip(&mut run, &a).unwrap();
        equip(&ctx, &mut run, &c).unwrap();
        assert!(matches!(unequip(&mut run, &a), Err(Error::UnknownItem(_))));
    }

    #[test]
    fn test_equip_unknown_item() {
        let catalog = fixtures::catalog();
        let ctx = ResolveContext { catalog: &catalog, caps: None, now: fixtures::now() };
        let mut run = fixtures::run();
        assert!(matches!(
            equip(&ctx, &mut run, &ItemId::from("ITM-000001")),
            Err(Error::UnknownItem(_))
        ));
    }
}
