//! Agent state machine integration tests
//!
//! Agents run inside a `Session` against real stacks: rival preemption,
//! resource harvesting, strike pacing, a missing combat resolver and
//! boundary-respecting movement.

use deckfield::agent::AgentState;
use deckfield::anim::Motion;
use deckfield::combat::{Combatant, DirectResolver};
use deckfield::core::{Bounds, EntityId, SimulationConfig, Suspendable, Vec2};
use deckfield::entity::{EntityDefinition, StatsTemplate, Tag};
use deckfield::simulation::{Session, Table, TableEventKind};
use deckfield::stack::{move_stack_to, stack_world_bounds};

const DT: f32 = 0.05;

fn config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.play_area = Some(Bounds::new(Vec2::ZERO, Vec2::new(20.0, 20.0)));
    config
}

fn definitions() -> Vec<EntityDefinition> {
    vec![
        EntityDefinition::new("wood", vec![]).with_stats(StatsTemplate {
            durability: 2.0,
            ..StatsTemplate::default()
        }),
        EntityDefinition::new("villager", vec![Tag::PlayableUnit, Tag::Character]).with_stats(
            StatsTemplate {
                max_hp: 12.0,
                attack: 3.0,
                ..StatsTemplate::default()
            },
        ),
        EntityDefinition::new("goblin", vec![Tag::Hostile]).with_stats(StatsTemplate {
            max_hp: 5.0,
            attack: 1.5,
            ..StatsTemplate::default()
        }),
    ]
}

fn session_with(config: SimulationConfig) -> Session {
    let mut session = Session::new(config);
    for def in definitions() {
        session.table.catalog.insert(def);
    }
    session
}

fn run(session: &mut Session, seconds: f32) {
    let steps = (seconds / DT).ceil() as usize;
    for _ in 0..steps {
        session.tick(DT);
    }
}

fn state(session: &Session, entity: EntityId) -> Option<AgentState> {
    session.agents.get(entity).map(|a| a.state)
}

fn hp(session: &Session, entity: EntityId) -> Option<f32> {
    session
        .table
        .entity(entity)
        .and_then(|e| e.combat.as_ref())
        .map(|c| c.hp())
}

/// Search radius 3, attack range 1, rival 2 away: chase this very tick
#[test]
fn test_rival_in_search_radius_is_chased_immediately() {
    let mut config = config();
    config.agent.search_radius = 3.0;
    config.agent.attack_range = 1.0;
    let mut session = session_with(config);
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let villager = session.spawn_key("villager", Vec2::new(7.0, 5.0)).unwrap();

    session.tick(DT);

    assert_eq!(state(&session, goblin), Some(AgentState::ChaseRival));
    assert_eq!(session.agents.get(goblin).unwrap().target, Some(villager));
    assert!(session.drain_events().iter().any(|e| e.kind
        == TableEventKind::AgentTransition {
            agent: goblin,
            from: AgentState::Patrol,
            to: AgentState::ChaseRival,
        }));
}

#[test]
fn test_rival_outside_search_radius_is_ignored() {
    let mut config = config();
    config.agent.search_radius = 3.0;
    config.agent.attack_range = 1.0;
    let mut session = session_with(config);
    let goblin = session.spawn_key("goblin", Vec2::new(2.0, 2.0)).unwrap();
    session.spawn_key("villager", Vec2::new(15.0, 15.0)).unwrap();

    session.tick(DT);

    assert_eq!(state(&session, goblin), Some(AgentState::Patrol));
}

#[test]
fn test_rival_preempts_resource_chase() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let wood = session.spawn_key("wood", Vec2::new(7.0, 5.0)).unwrap();

    session.tick(0.01);
    assert_eq!(state(&session, goblin), Some(AgentState::ChaseResource));
    assert_eq!(session.agents.get(goblin).unwrap().target, Some(wood));

    let villager = session.spawn_key("villager", Vec2::new(5.0, 7.0)).unwrap();
    session.tick(0.01);

    let agent = session.agents.get(goblin).unwrap();
    assert_eq!(agent.state, AgentState::ChaseRival);
    assert_eq!(agent.target, Some(villager));

    // the pending hop toward the wood was dropped for one toward the villager
    let hops: Vec<Vec2> = session
        .table
        .timelines
        .iter()
        .filter_map(|t| match t.motion {
            Motion::MoveStack { root, to, .. } if root == goblin => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(hops.len(), 1);
    assert!(hops[0].y > 5.5);
}

#[test]
fn test_rival_fight_runs_until_death() {
    let mut session = session_with(config());
    let villager = session.spawn_key("villager", Vec2::new(5.0, 5.0)).unwrap();
    let goblin = session.spawn_key("goblin", Vec2::new(6.0, 5.0)).unwrap();

    session.tick(DT);
    assert_eq!(state(&session, villager), Some(AgentState::AttackRival));
    assert_eq!(hp(&session, goblin), Some(2.0));
    assert!(session.agents.is_locked(villager));

    // cooldown holds the second strike back
    run(&mut session, 0.5);
    assert_eq!(hp(&session, goblin), Some(2.0));
    assert!(!session.agents.is_locked(villager));

    run(&mut session, 1.0);
    assert!(session.table.entity(goblin).is_none());
    assert!(session.agents.get(goblin).is_none());

    let villager_hp = hp(&session, villager).unwrap();
    assert!(villager_hp < 12.0 && villager_hp > 0.0);

    session.tick(DT);
    assert_eq!(state(&session, villager), Some(AgentState::Patrol));
    assert_eq!(session.agents.get(villager).unwrap().target, None);

    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| e.kind == TableEventKind::EntityDied { entity: goblin }));
}

#[test]
fn test_resource_is_harvested_until_depleted() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let wood = session.spawn_key("wood", Vec2::new(6.0, 5.0)).unwrap();

    session.tick(DT);
    assert_eq!(state(&session, goblin), Some(AgentState::AttackResource));

    run(&mut session, 3.0);

    assert!(session.table.entity(wood).is_none());
    assert_eq!(state(&session, goblin), Some(AgentState::Patrol));
    let events = session.drain_events();
    let strikes = events
        .iter()
        .filter(|e| matches!(e.kind, TableEventKind::ResourceStruck { resource, .. } if resource == wood))
        .count();
    assert_eq!(strikes, 2);
    assert!(events
        .iter()
        .any(|e| e.kind == TableEventKind::EntityDespawned { entity: wood }));
}

#[test]
fn test_dragged_resource_is_dropped_as_target() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let wood = session.spawn_key("wood", Vec2::new(8.0, 5.0)).unwrap();

    session.tick(0.01);
    assert_eq!(session.agents.get(goblin).unwrap().target, Some(wood));

    session.begin_drag(wood, false).unwrap();
    session.tick(0.01);

    let agent = session.agents.get(goblin).unwrap();
    assert_eq!(agent.state, AgentState::Patrol);
    assert_eq!(agent.target, None);
}

#[test]
fn test_missing_resolver_keeps_agents_running() {
    let mut table = Table::new(config());
    for def in definitions() {
        table.catalog.insert(def);
    }
    let mut session = Session::without_resolver(table);
    let villager = session.spawn_key("villager", Vec2::new(5.0, 5.0)).unwrap();
    let goblin = session.spawn_key("goblin", Vec2::new(6.0, 5.0)).unwrap();

    run(&mut session, 1.5);

    assert_eq!(state(&session, villager), Some(AgentState::AttackRival));
    assert_eq!(hp(&session, goblin), Some(5.0));
    assert!(!session
        .drain_events()
        .iter()
        .any(|e| matches!(e.kind, TableEventKind::AttackRequested { .. })));

    // picked up again on the next discovery retry
    session.set_resolver(Box::new(DirectResolver));
    run(&mut session, 2.5);
    assert!(hp(&session, goblin).map_or(true, |hp| hp < 5.0));
}

#[test]
fn test_patrol_hops_stay_on_the_table() {
    let mut config = config();
    config.play_area = Some(Bounds::new(Vec2::ZERO, Vec2::new(6.0, 6.0)));
    let area = config.play_area.unwrap();
    let mut session = session_with(config);
    let goblin = session.spawn_key("goblin", Vec2::new(1.0, 1.0)).unwrap();

    for _ in 0..600 {
        session.tick(1.0 / 60.0);
        let bounds = stack_world_bounds(&session.table.world, goblin);
        assert!(bounds.min.x >= area.min.x - 1e-3 && bounds.min.y >= area.min.y - 1e-3);
        assert!(bounds.max.x <= area.max.x + 1e-3 && bounds.max.y <= area.max.y + 1e-3);
    }
    assert_eq!(state(&session, goblin), Some(AgentState::Patrol));
    assert_ne!(session.table.position(goblin), Some(Vec2::new(1.0, 1.0)));
}

#[test]
fn test_pause_freezes_agents_and_resume_continues() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(10.0, 10.0)).unwrap();
    run(&mut session, 0.1);

    session.suspend();
    let frozen_at = session.table.position(goblin);
    let frozen_time = session.now();
    run(&mut session, 2.0);
    assert_eq!(session.table.position(goblin), frozen_at);
    assert_eq!(session.now(), frozen_time);

    session.resume();
    run(&mut session, 2.0);
    assert_ne!(session.table.position(goblin), frozen_at);
}

#[test]
fn test_suspended_entity_sits_out_while_others_act() {
    let mut session = session_with(config());
    let idle = session.spawn_key("goblin", Vec2::new(4.0, 4.0)).unwrap();
    let busy = session.spawn_key("goblin", Vec2::new(14.0, 14.0)).unwrap();
    session.suspend_entity(idle);

    run(&mut session, 2.0);
    assert_eq!(session.table.position(idle), Some(Vec2::new(4.0, 4.0)));
    assert_ne!(session.table.position(busy), Some(Vec2::new(14.0, 14.0)));

    session.resume_entity(idle);
    run(&mut session, 2.0);
    assert_ne!(session.table.position(idle), Some(Vec2::new(4.0, 4.0)));
}

/// Move a stack by hand, as if an outside force put it there
fn shove(session: &mut Session, entity: EntityId, to: Vec2) {
    session.table.cancel_moves(entity);
    move_stack_to(&mut session.table.world, entity, to);
}

#[test]
fn test_resource_moved_away_is_chased_again() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let wood = session.spawn_key("wood", Vec2::new(6.0, 5.0)).unwrap();

    session.tick(DT);
    assert_eq!(state(&session, goblin), Some(AgentState::AttackResource));

    shove(&mut session, wood, Vec2::new(8.0, 5.0));
    session.table.settle(wood);
    session.tick(DT);

    let agent = session.agents.get(goblin).unwrap();
    assert_eq!(agent.state, AgentState::ChaseResource);
    assert_eq!(agent.target, Some(wood));
    assert!(session.drain_events().iter().any(|e| e.kind
        == TableEventKind::AgentTransition {
            agent: goblin,
            from: AgentState::AttackResource,
            to: AgentState::ChaseResource,
        }));
}

#[test]
fn test_rival_leaving_search_radius_ends_the_fight() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(5.0, 5.0)).unwrap();
    let villager = session.spawn_key("villager", Vec2::new(6.0, 5.0)).unwrap();

    session.tick(DT);
    assert_eq!(state(&session, goblin), Some(AgentState::AttackRival));

    shove(&mut session, villager, Vec2::new(17.0, 17.0));
    session.table.settle(villager);
    session.tick(DT);

    let agent = session.agents.get(goblin).unwrap();
    assert_eq!(agent.state, AgentState::Patrol);
    assert_eq!(agent.target, None);
}

#[test]
fn test_rival_leaving_play_area_is_dropped() {
    let mut session = session_with(config());
    let goblin = session.spawn_key("goblin", Vec2::new(16.0, 10.0)).unwrap();
    let villager = session.spawn_key("villager", Vec2::new(19.0, 10.0)).unwrap();

    session.tick(DT);
    assert_eq!(state(&session, goblin), Some(AgentState::ChaseRival));

    // half the villager's box now hangs past the right edge
    shove(&mut session, villager, Vec2::new(20.2, 10.0));
    session.tick(DT);

    let agent = session.agents.get(goblin).unwrap();
    assert_eq!(agent.state, AgentState::Patrol);
    assert_eq!(agent.target, None);
}

#[test]
fn test_agent_picked_up_mid_strike_keeps_striking() {
    let mut session = session_with(config());
    session.table.catalog.insert(
        EntityDefinition::new("log", vec![]).with_stats(StatsTemplate {
            durability: 50.0,
            ..StatsTemplate::default()
        }),
    );
    let villager = session.spawn_key("villager", Vec2::new(5.0, 5.0)).unwrap();
    let log = session.spawn_key("log", Vec2::new(6.0, 5.0)).unwrap();

    session.tick(DT);
    session.tick(DT);
    assert!(session.agents.is_locked(villager));

    session.begin_drag(villager, false).unwrap();
    session.drag_to(Vec2::new(5.0, 5.0)).unwrap();
    session.end_drag().unwrap();
    session.drain_events();

    run(&mut session, 3.0);
    let strikes = session
        .drain_events()
        .iter()
        .filter(|e| matches!(e.kind, TableEventKind::ResourceStruck { resource, .. } if resource == log))
        .count();
    assert!(strikes >= 2, "only {strikes} strikes after release");
}
