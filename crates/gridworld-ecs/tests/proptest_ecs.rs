//! Property tests for World operations.
//!
//! These tests use `proptest` to generate random sequences of world
//! operations and verify that the registry invariants hold after each one,
//! and that clones taken along the way are never affected by later writes.

use gridworld_ecs::prelude::*;
use proptest::prelude::*;

/// Operations we can perform on the world.
#[derive(Debug, Clone)]
enum WorldOp {
    SpawnBox(i32, i32),
    SpawnWall(i32, i32),
    Despawn(usize),
    Move(usize, i32, i32),
    Unplace(usize),
    Snapshot,
}

fn world_op_strategy() -> impl Strategy<Value = WorldOp> {
    prop_oneof![
        (0..8i32, 0..8i32).prop_map(|(x, y)| WorldOp::SpawnBox(x, y)),
        (0..8i32, 0..8i32).prop_map(|(x, y)| WorldOp::SpawnWall(x, y)),
        (0..100usize).prop_map(WorldOp::Despawn),
        (0..100usize, 0..8i32, 0..8i32).prop_map(|(i, x, y)| WorldOp::Move(i, x, y)),
        (0..100usize).prop_map(WorldOp::Unplace),
        Just(WorldOp::Snapshot),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_invariants(ops in prop::collection::vec(world_op_strategy(), 1..50)) {
        let mut world = World::new();
        let mut alive: Vec<EntityId> = Vec::new();
        let mut frozen: Vec<(World, WorldSnapshot)> = Vec::new();

        for op in ops {
            match op {
                WorldOp::SpawnBox(x, y) => {
                    alive.push(world.spawn_bundle(
                        ComponentBundle::new()
                            .with(Position::new(x, y))
                            .with(Pushable)
                            .with(Collidable),
                    ));
                }
                WorldOp::SpawnWall(x, y) => {
                    alive.push(world.spawn_bundle(
                        ComponentBundle::new()
                            .with(Position::new(x, y))
                            .with(Blocking)
                            .with(Collidable),
                    ));
                }
                WorldOp::Despawn(idx) => {
                    if !alive.is_empty() {
                        let e = alive.remove(idx % alive.len());
                        prop_assert!(world.despawn(e).is_ok());
                    }
                }
                WorldOp::Move(idx, x, y) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        prop_assert!(world.insert(e, Position::new(x, y)).is_ok());
                    }
                }
                WorldOp::Unplace(idx) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        world.remove::<Position>(e);
                    }
                }
                WorldOp::Snapshot => {
                    frozen.push((world.clone(), world.capture_snapshot()));
                }
            }

            prop_assert_eq!(world.entity_count(), alive.len());
            prop_assert!(world.validate().is_ok());
            for &e in &alive {
                prop_assert!(world.is_alive(e));
            }
        }

        // Clones taken earlier still match what they looked like back then.
        for (clone, snapshot) in &frozen {
            prop_assert_eq!(&clone.capture_snapshot(), snapshot);
        }
    }

    #[test]
    fn entities_at_matches_a_brute_force_scan(
        cells in prop::collection::vec(prop::option::of((0..4i32, 0..4i32)), 1..30),
        target in (0..4i32, 0..4i32),
    ) {
        let mut world = World::new();
        let mut placed: Vec<(EntityId, Option<Position>)> = Vec::new();
        for cell in cells {
            let at = cell.map(Position::from);
            let bundle = match at {
                Some(p) => ComponentBundle::new().with(p).with(Collidable),
                None => ComponentBundle::new().with(Collidable),
            };
            placed.push((world.spawn_bundle(bundle), at));
        }
        let cell = Position::from(target);

        // Scan the registry one entity at a time.
        let scanned: Vec<EntityId> = world
            .entities()
            .filter(|&id| world.get::<Position>(id) == Some(&cell))
            .collect();
        // And the spawn log, which never touches the world.
        let logged: Vec<EntityId> = placed
            .iter()
            .filter(|(_, at)| *at == Some(cell))
            .map(|(id, _)| *id)
            .collect();

        let found = world.entities_at(cell);
        prop_assert_eq!(&found, &scanned);
        prop_assert_eq!(&found, &logged);
    }
}
