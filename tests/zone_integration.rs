//! Zone containment integration tests
//!
//! Containment is all-or-nothing over the stack's full bounding box; zones
//! react to what settles in them.

use std::sync::Arc;

use deckfield::core::{Bounds, SimulationConfig, Vec2, ZoneId};
use deckfield::entity::EntityDefinition;
use deckfield::placement::DropOutcome;
use deckfield::simulation::{Session, Table, TableEventKind};
use deckfield::spatial::find_containing_zone;
use deckfield::stack::{merge, move_stack_to, NullPresenter};
use deckfield::zone::{Recipe, RecipeBook, RecipeInput, Zone};

fn square(min: f32, max: f32) -> Bounds {
    Bounds::new(Vec2::new(min, min), Vec2::new(max, max))
}

/// Table with a generic zone spanning [4, 6] and 2x2 "crate" pieces
fn table() -> (Table, ZoneId, Arc<EntityDefinition>) {
    let mut table = Table::new(SimulationConfig::default());
    let zone = table
        .zones
        .register(Zone::generic("pad", square(4.0, 6.0)))
        .unwrap();
    let def = table
        .catalog
        .insert(EntityDefinition::new("crate", vec![]).with_size(Vec2::new(2.0, 2.0)));
    (table, zone, def)
}

#[test]
fn test_exact_fit_is_contained() {
    let (mut table, zone, def) = table();
    let id = table.spawn(def, Vec2::new(5.0, 5.0));

    assert_eq!(find_containing_zone(&table.world, &table.zones, id), Some(zone));
    assert_eq!(table.entity(id).unwrap().current_zone, Some(zone));
}

#[test]
fn test_one_corner_outside_is_not_contained() {
    let (mut table, zone, def) = table();
    let id = table.spawn(def, Vec2::new(5.0, 5.0));
    table.events.clear();

    move_stack_to(&mut table.world, id, Vec2::new(5.25, 5.25));
    table.raise_position_changed(id);

    assert_eq!(table.entity(id).unwrap().current_zone, None);
    assert!(table.events.iter().any(|e| e.kind
        == TableEventKind::ZoneChanged {
            root: id,
            previous: Some(zone),
            current: None,
        }));
}

#[test]
fn test_stack_overhanging_zone_is_not_contained() {
    let (mut table, _, def) = table();
    let bottom = table.spawn(Arc::clone(&def), Vec2::new(5.0, 5.0));
    let top = table.spawn(def, Vec2::new(12.0, 12.0));

    let config = table.config.stack.clone();
    let outcome = merge(
        &mut table.world,
        top,
        bottom,
        Some(top),
        &config,
        &mut table.rng,
        &mut NullPresenter,
    )
    .unwrap();
    table.raise_position_changed(outcome.root);

    // the top card's offset pushes the stack's box past the zone's upper edge
    assert_eq!(find_containing_zone(&table.world, &table.zones, bottom), None);
    assert_eq!(table.entity(bottom).unwrap().current_zone, None);
}

#[test]
fn test_zone_change_is_logged_once() {
    let (mut table, zone, def) = table();
    let id = table.spawn(def, Vec2::new(15.0, 15.0));
    table.events.clear();

    move_stack_to(&mut table.world, id, Vec2::new(5.0, 5.0));
    table.raise_position_changed(id);
    table.raise_position_changed(id);

    let changes: Vec<_> = table
        .events
        .iter()
        .filter(|e| matches!(e.kind, TableEventKind::ZoneChanged { .. }))
        .collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].kind,
        TableEventKind::ZoneChanged {
            root: id,
            previous: None,
            current: Some(zone),
        }
    );
}

#[test]
fn test_same_category_zones_may_not_overlap() {
    let (mut table, _, _) = table();
    assert!(table
        .zones
        .register(Zone::generic("overlap", square(5.0, 8.0)))
        .is_err());
    assert!(table
        .zones
        .register(Zone::crafting("bench", square(5.0, 8.0)))
        .is_ok());
}

fn crafting_session() -> (Session, ZoneId) {
    let mut config = SimulationConfig::default();
    config.play_area = Some(square(0.0, 30.0));
    let mut session = Session::new(config);
    session
        .table
        .catalog
        .insert(EntityDefinition::new("wood", vec![]));
    session
        .table
        .catalog
        .insert(EntityDefinition::new("plank", vec![]));
    session.table.zones.set_recipes(RecipeBook::new(vec![Recipe {
        name: "saw".into(),
        inputs: vec![RecipeInput {
            key: "wood".into(),
            count: 2,
        }],
        output: "plank".into(),
        duration: 1.0,
    }]));
    let bench = session
        .table
        .zones
        .register(Zone::crafting("bench", square(2.0, 10.0)))
        .unwrap();
    (session, bench)
}

fn available(session: &mut Session, zone: ZoneId) -> Vec<Option<String>> {
    session
        .drain_events()
        .into_iter()
        .filter_map(|e| match e.kind {
            TableEventKind::CraftAvailable { zone: z, recipe } if z == zone => Some(recipe),
            _ => None,
        })
        .collect()
}

#[test]
fn test_crafting_zone_tracks_contents() {
    let (mut session, bench) = crafting_session();
    session.spawn_key("wood", Vec2::new(4.0, 6.0)).unwrap();
    let second = session.spawn_key("wood", Vec2::new(20.0, 20.0)).unwrap();
    assert!(available(&mut session, bench).is_empty());

    // a drop inside a crafting zone never merges, it waits for the trigger
    session.begin_drag(second, false).unwrap();
    session.drag_to(Vec2::new(8.0, 6.0)).unwrap();
    assert_eq!(
        session.end_drag().unwrap(),
        DropOutcome::AwaitingCraft { zone: bench }
    );
    assert_eq!(available(&mut session, bench), vec![Some("saw".to_string())]);

    session.begin_drag(second, false).unwrap();
    session.drag_to(Vec2::new(20.0, 20.0)).unwrap();
    assert_eq!(session.end_drag().unwrap(), DropOutcome::Placed { zone: None });
    assert_eq!(available(&mut session, bench), vec![None]);
}

#[test]
fn test_moving_inputs_out_stops_the_countdown() {
    let (mut session, bench) = crafting_session();
    let a = session.spawn_key("wood", Vec2::new(4.0, 6.0)).unwrap();
    session.spawn_key("wood", Vec2::new(8.0, 6.0)).unwrap();
    assert_eq!(session.start_craft(bench).unwrap(), Some("saw".into()));

    session.begin_drag(a, false).unwrap();
    session.drag_to(Vec2::new(20.0, 20.0)).unwrap();
    session.end_drag().unwrap();

    for _ in 0..40 {
        session.tick(0.05);
    }
    assert!(!session
        .table
        .world
        .iter()
        .any(|e| e.definition.key == "plank"));
    assert_eq!(session.table.world.len(), 2);
}
