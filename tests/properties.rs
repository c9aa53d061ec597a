//! Property tests for the stack linkage invariant and the boundary clamp

use std::sync::Arc;

use deckfield::core::{Bounds, EntityId, SimulationConfig, Vec2};
use deckfield::entity::EntityDefinition;
use deckfield::simulation::Table;
use deckfield::spatial::{clamp_delta, clamp_stack};
use deckfield::stack::{
    members_including_self, merge, move_stack_to, split, stack_world_bounds, NullPresenter,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Merge(usize, usize),
    Split(usize),
    Destroy(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..10, 0usize..10).prop_map(|(a, b)| Op::Merge(a, b)),
        2 => (0usize..10).prop_map(Op::Split),
        1 => (0usize..10).prop_map(Op::Destroy),
    ]
}

fn arb_bounds() -> impl Strategy<Value = Bounds> {
    (-50.0f32..50.0, -50.0f32..50.0, 0.5f32..30.0, 0.5f32..30.0)
        .prop_map(|(x, y, w, h)| Bounds::new(Vec2::new(x, y), Vec2::new(x + w, y + h)))
}

fn table_of(n: usize, max_stack_size: usize) -> (Table, Vec<EntityId>) {
    let mut config = SimulationConfig::default();
    config.stack.max_stack_size = max_stack_size;
    let mut table = Table::new(config);
    let wood = table.catalog.insert(EntityDefinition::new("wood", vec![]));
    let ids = (0..n)
        .map(|i| table.spawn(Arc::clone(&wood), Vec2::new(i as f32 * 3.0, 0.0)))
        .collect();
    (table, ids)
}

fn apply(table: &mut Table, ids: &[EntityId], op: &Op) {
    match *op {
        Op::Merge(a, b) => {
            let config = table.config.stack.clone();
            // refusals (same stack, despawned ids) leave the world untouched
            let _ = merge(
                &mut table.world,
                ids[a],
                ids[b],
                Some(ids[a]),
                &config,
                &mut table.rng,
                &mut NullPresenter,
            );
        }
        Op::Split(a) => {
            split(&mut table.world, ids[a], &mut NullPresenter);
        }
        Op::Destroy(a) => {
            table.destroy(ids[a]);
        }
    }
}

proptest! {
    /// Every reachable state keeps each stack's root first with zero offset,
    /// every member pointing back at it, and no stack over capacity.
    #[test]
    fn test_linkage_holds_across_merge_split_destroy(
        ops in prop::collection::vec(arb_op(), 1..40),
        capacity in 2usize..6,
    ) {
        let (mut table, ids) = table_of(10, capacity);
        for op in &ops {
            apply(&mut table, &ids, op);

            prop_assert!(table.world.linkage_violations().is_empty(), "after {:?}", op);
            for root in table.world.roots() {
                let members = members_including_self(&table.world, root.id);
                prop_assert_eq!(members[0], root.id);
                prop_assert_eq!(root.offset_from_root(), Vec2::ZERO);
                prop_assert!(members.len() <= capacity);
                for id in &members[1..] {
                    let member = table.entity(*id).unwrap();
                    prop_assert_eq!(member.root(), Some(root.id));
                    prop_assert!(member.members().is_empty());
                }
            }
        }
    }

    /// A second clamp never moves anything further
    #[test]
    fn test_clamp_delta_is_idempotent(bounds in arb_bounds(), area in arb_bounds()) {
        let first = clamp_delta(&bounds, &area);
        let second = clamp_delta(&bounds.translate(first), &area);
        prop_assert!(second.x.abs() < 1e-3 && second.y.abs() < 1e-3, "{:?}", second);
    }

    /// A box that fits in the area ends up fully inside it
    #[test]
    fn test_clamped_stack_lies_within_area(x in -40.0f32..60.0, y in -40.0f32..60.0) {
        let (mut table, ids) = table_of(1, 99);
        let area = Bounds::new(Vec2::ZERO, Vec2::new(20.0, 20.0));
        move_stack_to(&mut table.world, ids[0], Vec2::new(x, y));

        clamp_stack(&mut table.world, ids[0], Some(&area));

        let bounds = stack_world_bounds(&table.world, ids[0]);
        prop_assert!(bounds.min.x >= -1e-3 && bounds.min.y >= -1e-3);
        prop_assert!(bounds.max.x <= 20.0 + 1e-3 && bounds.max.y <= 20.0 + 1e-3);
    }
}
