//! End-to-end scenarios against the shipped catalog in `data/`

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;
use zenithfall_catalog::{Catalog, Loader, OutcomeTier};
use zenithfall_core::{ActionKind, DefId, FixedClock, ItemId, MaterialId, UserId};
use zenithfall_db::Store;
use zenithfall_engine::{
    DailyLimits, Engine, EngineConfig, Error, ErrorKind, Failure, Observation, Response, RunPatch,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn catalog() -> Catalog {
    Loader::from_directory(data_dir()).unwrap()
}

/// 10:00 local time in UTC+9
fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 1, 0, 0).unwrap()
}

fn engine_with(config: EngineConfig) -> Engine<FixedClock> {
    Engine::new(
        catalog(),
        Store::in_memory().unwrap(),
        config,
        FixedClock::new(morning()),
    )
    .unwrap()
}

fn engine() -> Engine<FixedClock> {
    engine_with(EngineConfig::default())
}

fn debug_engine() -> Engine<FixedClock> {
    engine_with(EngineConfig {
        debug: true,
        ..EngineConfig::default()
    })
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

fn photo(material: &str, essence: &str, quality: i64) -> Observation {
    Observation {
        material_type: DefId::new(material),
        essence: DefId::new(essence),
        quality,
        hint_text: format!("a {} thing", material),
    }
}

fn start_felina(engine: &Engine<FixedClock>, who: &UserId) {
    engine
        .start_run(who, &DefId::new("felina"), Some("Mike"))
        .unwrap();
}

/// Transmute and craft an Iron Key, returning its id
fn forge_key(engine: &Engine<FixedClock>, who: &UserId) -> ItemId {
    let material = engine
        .transmute_photo(who, photo("metal", "control", 3))
        .unwrap()
        .material;
    engine
        .craft_item(who, vec![material.id], None)
        .unwrap()
        .item
        .id
}

#[test]
fn shipped_catalog_loads() {
    let catalog = catalog();
    assert_eq!(catalog.races.len(), 5);
    assert_eq!(catalog.schema.materials.len(), 10);
    assert_eq!(catalog.schema.essences.len(), 12);
    assert_eq!(catalog.rank_for_depth(0), 1);
    assert_eq!(catalog.rank_for_depth(12), 3);
    assert_eq!(
        catalog.race(&DefId::new("felina")).unwrap().default_name,
        "Mike"
    );
}

#[test]
fn felina_and_mike() {
    let engine = engine();
    let who = user("player-1");

    let started = engine
        .start_run(&who, &DefId::new("felina"), Some("Mike"))
        .unwrap();
    assert!(started.created);
    assert_eq!(started.status.companion_affinity, 0);
    assert_eq!(started.status.companion_name, "Mike");

    let transmuted = engine
        .transmute_photo(&who, photo("metal", "control", 3))
        .unwrap();
    let material = transmuted.material;
    assert_eq!(material.material_type.as_str(), "metal");
    assert_eq!(material.essence.as_str(), "control");
    assert!((2..=4).contains(&material.quality));

    let crafted = engine
        .craft_item(&who, vec![material.id.clone()], None)
        .unwrap();
    assert_eq!(crafted.recipe_id.as_str(), "iron_key");
    let status = engine.get_status(&who).unwrap();
    assert!(status.materials.is_empty());
    assert_eq!(status.items.len(), 1);

    let gifted = engine.gift(&who, &crafted.item.id).unwrap();
    // Tool is Felina's favourite tag on an Iron Key, at full strength from zero
    assert!(gifted.liked);
    assert_eq!(gifted.delta, 8);
    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.companion_affinity, 8);
    assert!(status.items.is_empty());
}

#[test]
fn start_run_loads_existing_run() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);
    engine
        .transmute_photo(&who, photo("wood", "create", 2))
        .unwrap();

    let again = engine
        .start_run(&who, &DefId::new("tigr"), Some("Somebody Else"))
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.status.race_id.as_str(), "felina");
    assert_eq!(again.status.companion_name, "Mike");
    assert_eq!(again.status.materials.len(), 1);
}

#[test]
fn craft_consumes_exactly_its_inputs() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);
    let glass = engine
        .transmute_photo(&who, photo("stone_glass", "light", 3))
        .unwrap()
        .material;
    let metal = engine
        .transmute_photo(&who, photo("metal", "defense", 4))
        .unwrap()
        .material;
    let spare = engine
        .transmute_photo(&who, photo("paper", "knowledge", 2))
        .unwrap()
        .material;

    let crafted = engine
        .craft_item(&who, vec![metal.id.clone(), glass.id.clone()], None)
        .unwrap();
    assert_eq!(crafted.recipe_id.as_str(), "lantern");

    let status = engine.get_status(&who).unwrap();
    let left: Vec<MaterialId> = status.materials.iter().map(|m| m.id.clone()).collect();
    assert_eq!(left, vec![spare.id]);
    assert_eq!(status.items.len(), 1);
    assert_eq!(status.items[0].id, crafted.item.id);
}

#[test]
fn failed_craft_changes_nothing() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);
    let paper = engine
        .transmute_photo(&who, photo("paper", "dark", 3))
        .unwrap()
        .material;

    assert!(matches!(
        engine.craft_item(&who, vec![paper.id.clone()], None),
        Err(Error::NoMatchingRecipe)
    ));
    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.materials.len(), 1);
    assert_eq!(status.quotas[1].action, ActionKind::Craft);
    assert_eq!(status.quotas[1].used, 0);
}

#[test]
fn daily_limit_blocks_the_extra_call() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    for _ in 0..3 {
        engine
            .transmute_photo(&who, photo("cloth", "preserve", 2))
            .unwrap();
    }
    assert!(matches!(
        engine.transmute_photo(&who, photo("cloth", "preserve", 2)),
        Err(Error::DailyLimitExceeded {
            action: ActionKind::Transmute,
            limit: 3
        })
    ));

    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.materials.len(), 3);
    assert_eq!(status.quotas[0].used, 3);
    assert_eq!(status.quotas[0].remaining, Some(0));
}

#[test]
fn fourth_craft_is_refused() {
    let engine = engine_with(EngineConfig {
        daily_limits: DailyLimits {
            transmute: 10,
            ..DailyLimits::default()
        },
        ..EngineConfig::default()
    });
    let who = user("player-1");
    start_felina(&engine, &who);

    for _ in 0..3 {
        forge_key(&engine, &who);
    }
    let spare = engine
        .transmute_photo(&who, photo("metal", "control", 3))
        .unwrap()
        .material;
    assert!(matches!(
        engine.craft_item(&who, vec![spare.id.clone()], None),
        Err(Error::DailyLimitExceeded {
            action: ActionKind::Craft,
            limit: 3
        })
    ));

    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.items.len(), 3);
    assert_eq!(status.materials.len(), 1);
    assert_eq!(status.materials[0].id, spare.id);
    assert_eq!(status.quotas[1].used, 3);
}

#[test]
fn fourth_gift_is_refused() {
    let engine = engine_with(EngineConfig {
        daily_limits: DailyLimits {
            transmute: 10,
            craft: 10,
            ..DailyLimits::default()
        },
        ..EngineConfig::default()
    });
    let who = user("player-1");
    start_felina(&engine, &who);

    for _ in 0..3 {
        let key = forge_key(&engine, &who);
        engine.gift(&who, &key).unwrap();
    }
    let key = forge_key(&engine, &who);
    let before = engine.get_status(&who).unwrap().companion_affinity;
    assert!(matches!(
        engine.gift(&who, &key),
        Err(Error::DailyLimitExceeded {
            action: ActionKind::Gift,
            limit: 3
        })
    ));

    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.companion_affinity, before);
    assert_eq!(status.items.len(), 1);
    assert_eq!(status.items[0].id, key);
}

#[test]
fn counters_reset_at_local_midnight() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);
    for _ in 0..3 {
        engine
            .transmute_photo(&who, photo("cloth", "preserve", 2))
            .unwrap();
    }

    // 23:59 local: still the same day
    engine
        .clock()
        .set(Utc.with_ymd_and_hms(2026, 5, 1, 14, 59, 0).unwrap());
    assert!(engine
        .transmute_photo(&who, photo("cloth", "preserve", 2))
        .is_err());

    // 00:01 local the next day
    engine.clock().advance(Duration::minutes(2));
    assert_eq!(engine.get_status(&who).unwrap().quotas[0].used, 0);
    engine
        .transmute_photo(&who, photo("cloth", "preserve", 2))
        .unwrap();
    assert_eq!(engine.get_status(&who).unwrap().quotas[0].used, 1);
}

#[test]
fn debug_bypasses_limits_but_still_counts() {
    let engine = debug_engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    for _ in 0..5 {
        engine
            .transmute_photo(&who, photo("organic", "heal", 3))
            .unwrap();
    }
    let status = engine.get_status(&who).unwrap();
    assert_eq!(status.quotas[0].used, 5);
    assert_eq!(status.quotas[0].remaining, None);

    let status = engine.reset_daily(&who).unwrap();
    assert_eq!(status.quotas[0].used, 0);
}

#[test]
fn debug_operations_refused_when_disabled() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    assert!(matches!(engine.reset_daily(&who), Err(Error::DebugDisabled)));
    assert!(matches!(
        engine.set_state(&who, RunPatch::default()),
        Err(Error::DebugDisabled)
    ));
    assert!(matches!(engine.get_state(&who), Err(Error::DebugDisabled)));
}

#[test]
fn gifts_have_diminishing_positive_returns() {
    let engine = debug_engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    let mut last = u32::MAX;
    let mut affinity = 0;
    for _ in 0..12 {
        let key = forge_key(&engine, &who);
        let gifted = engine.gift(&who, &key).unwrap();
        assert!(gifted.delta > 0);
        assert!(gifted.delta <= last);
        assert_eq!(gifted.affinity, affinity + gifted.delta);
        last = gifted.delta;
        affinity = gifted.affinity;
    }
    assert!(affinity > 20);
    assert!(engine.get_status(&who).unwrap().phase >= 2);
}

#[test]
fn concurrent_crafts_race_for_one_material() {
    let engine = Arc::new(engine());
    let who = user("player-1");
    start_felina(&engine, &who);
    let material = engine
        .transmute_photo(&who, photo("metal", "control", 3))
        .unwrap()
        .material;

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let who = who.clone();
            let id = material.id.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.craft_item(&who, vec![id], None)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(Error::UnknownMaterial(id)) if *id == material.id)));

    let status = engine.get_status(&who).unwrap();
    assert!(status.materials.is_empty());
    assert_eq!(status.items.len(), 1);
    assert_eq!(status.quotas[1].used, 1);
}

#[test]
fn explore_gates_and_styles() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    assert!(matches!(
        engine.explore(&who, &DefId::new("storm_spire"), &DefId::new("careful")),
        Err(Error::DungeonLocked { tier: 3, rank: 1, .. })
    ));
    assert!(matches!(
        engine.explore(&who, &DefId::new("rusted_mine"), &DefId::new("dance")),
        Err(Error::InvalidStyle { .. })
    ));
    assert!(matches!(
        engine.explore(&who, &DefId::new("nowhere"), &DefId::new("careful")),
        Err(Error::NotFound(_))
    ));

    let available: Vec<String> = engine
        .get_available_dungeons(&who)
        .unwrap()
        .into_iter()
        .map(|d| d.id.to_string())
        .collect();
    assert_eq!(available, vec!["whispering_woods", "rusted_mine"]);

    engine
        .explore(&who, &DefId::new("rusted_mine"), &DefId::new("careful"))
        .unwrap();
    assert!(matches!(
        engine.explore(&who, &DefId::new("rusted_mine"), &DefId::new("careful")),
        Err(Error::DailyLimitExceeded { .. })
    ));
}

#[test]
fn setbacks_never_advance_and_depth_is_capped() {
    let engine = debug_engine();
    let who = user("player-1");
    start_felina(&engine, &who);
    let woods = DefId::new("whispering_woods");

    let mut progress = 0;
    let mut setbacks = 0;
    for _ in 0..40 {
        let out = engine
            .explore(&who, &woods, &DefId::new("bold"))
            .unwrap();
        if out.tier == OutcomeTier::Setback {
            setbacks += 1;
            assert_eq!(out.progress_delta, 0);
            assert_eq!(out.affinity_delta, 0);
            assert_eq!(out.progress, progress);
        } else {
            assert_eq!(out.progress, (progress + 1).min(5));
        }
        progress = out.progress;
    }
    assert!(setbacks > 0);
    assert_eq!(progress, 5);
    assert_eq!(engine.get_status(&who).unwrap().rank, 2);
}

#[test]
fn companion_vanishes_and_returns() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    engine.clock().advance(Duration::days(30));
    assert!(matches!(
        engine.explore(&who, &DefId::new("whispering_woods"), &DefId::new("careful")),
        Err(Error::CompanionVanished)
    ));

    let out = engine
        .transmute_photo(&who, photo("organic", "heal", 3))
        .unwrap();
    assert!(out.revived);
    engine
        .explore(&who, &DefId::new("whispering_woods"), &DefId::new("careful"))
        .unwrap();
}

#[test]
fn start_run_records_a_vanish() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    engine.clock().advance(Duration::days(30));
    let again = engine
        .start_run(&who, &DefId::new("felina"), None)
        .unwrap();
    assert!(!again.created);
    assert!(again.status.vanished);

    // The vanish stays recorded after the gap is reset
    engine.clock().advance(Duration::hours(1));
    assert!(engine.get_status(&who).unwrap().vanished);
}

#[test]
fn start_run_counts_as_activity() {
    let engine = engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    engine.clock().advance(Duration::days(20));
    let again = engine
        .start_run(&who, &DefId::new("felina"), None)
        .unwrap();
    assert!(!again.status.vanished);

    engine.clock().advance(Duration::days(20));
    engine
        .explore(&who, &DefId::new("whispering_woods"), &DefId::new("careful"))
        .unwrap();
}

#[test]
fn json_requests_round_trip() {
    let engine = engine();

    let response = engine
        .handle_json(
            "player-1",
            r#"{"op": "start_run", "race_id": "felina", "partner_name": "Mike"}"#,
        )
        .unwrap();
    assert!(matches!(response, Response::Started(_)));

    let err = engine
        .handle_json(
            "player-1",
            r#"{"op": "transmute_photo", "detected_material": "metal", "detected_essence": "control", "detected_quality": 3, "flash": true}"#,
        )
        .unwrap_err();
    let failure = Failure::from(&err);
    assert_eq!(failure.kind, ErrorKind::MalformedPayload);

    let response = engine
        .handle_json(
            "player-1",
            r#"{"op": "transmute_photo", "detected_material": "metal", "detected_essence": "control", "detected_quality": 3}"#,
        )
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "transmuted");
    assert_eq!(json["data"]["material"]["id"], "MAT-000001");

    let status = engine.get_status(&user("player-1")).unwrap();
    assert_eq!(status.quotas[0].used, 1);
}

#[test]
fn set_state_patches_through_debug() {
    let engine = debug_engine();
    let who = user("player-1");
    start_felina(&engine, &who);

    let status = engine
        .set_state(
            &who,
            RunPatch {
                rank: Some(3),
                companion_affinity: Some(60),
                phase: Some(4),
                ..RunPatch::default()
            },
        )
        .unwrap();
    assert_eq!(status.rank_name.as_deref(), Some("Delver"));

    let ids: Vec<String> = engine
        .get_available_dungeons(&who)
        .unwrap()
        .into_iter()
        .map(|d| d.id.to_string())
        .collect();
    assert_eq!(ids.len(), 4);

    let run = engine.get_state(&who).unwrap();
    assert_eq!(run.companion_affinity, 60);
}

#[test]
fn file_store_survives_reopen() {
    let path = std::env::temp_dir().join(format!("zenithfall-scenario-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let config = EngineConfig {
        data_dir: data_dir(),
        db_path: Some(path.clone()),
        ..EngineConfig::default()
    };
    let who = user("player-1");

    {
        let engine = Engine::open(config.clone()).unwrap();
        engine
            .start_run(&who, &DefId::new("lupus"), None)
            .unwrap();
    }
    {
        let engine = Engine::open(config).unwrap();
        let status = engine.get_status(&who).unwrap();
        assert_eq!(status.companion_name, "Rou");
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn recipes_listed_in_catalog_order() {
    let recipes = engine().get_recipes();
    assert_eq!(recipes.len(), 12);
    assert_eq!(recipes[0].id.as_str(), "iron_key");
    let blade = recipes
        .iter()
        .find(|r| r.id.as_str() == "flame_blade")
        .unwrap();
    assert_eq!(blade.rank, 2);
    assert_eq!(blade.catalyst, Some(DefId::new("ember_core")));
}
