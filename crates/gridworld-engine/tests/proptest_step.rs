//! Property tests for the step function.
//!
//! Random boards and random action sequences, checking after every step that
//! the board stays consistent and that `step` behaves as a pure function.

use std::collections::BTreeSet;
use std::sync::Arc;

use gridworld_engine::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Cell {
    Floor,
    Wall,
    Crate,
    Coin,
    Exit,
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        6 => Just(Cell::Floor),
        2 => Just(Cell::Wall),
        3 => Just(Cell::Crate),
        1 => Just(Cell::Coin),
        1 => Just(Cell::Exit),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Up),
        Just(Action::Down),
        Just(Action::Left),
        Just(Action::Right),
        Just(Action::Wait),
    ]
}

fn movement_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("default"),
        Just("wrap"),
        Just("mirror"),
        Just("slippery"),
        Just("windy"),
    ]
}

/// A board of `w x h` cells plus an agent position.
fn board_strategy() -> impl Strategy<Value = (i32, i32, Vec<Cell>, (i32, i32))> {
    (1..7i32, 1..7i32).prop_flat_map(|(w, h)| {
        (
            Just(w),
            Just(h),
            prop::collection::vec(cell_strategy(), (w * h) as usize),
            (0..w, 0..h),
        )
    })
}

fn build_state(w: i32, h: i32, cells: &[Cell], agent_at: (i32, i32), seed: u64) -> (State, EntityId) {
    let mut world = World::new();
    let agent = world.spawn_bundle(
        ComponentBundle::new()
            .with(Position::from(agent_at))
            .with(Agent)
            .with(Collidable)
            .with(Inventory::default()),
    );
    for (i, cell) in cells.iter().enumerate() {
        let at = Position::new(i as i32 % w, i as i32 / w);
        if at == Position::from(agent_at) {
            continue;
        }
        let bundle = match cell {
            Cell::Floor => continue,
            Cell::Wall => ComponentBundle::new().with(at).with(Blocking).with(Collidable),
            Cell::Crate => ComponentBundle::new().with(at).with(Pushable).with(Collidable),
            Cell::Coin => ComponentBundle::new().with(at).with(Collectible),
            Cell::Exit => ComponentBundle::new().with(at).with(Exit),
        };
        world.spawn_bundle(bundle);
    }
    let state = State::new(GridConfig::new(w, h).with_seed(seed), world).unwrap();
    (state, agent)
}

/// Cells holding more than one collidable entity.
fn collidable_overlaps(state: &State) -> usize {
    let mut seen = BTreeSet::new();
    let mut overlaps = 0;
    for (id, pos) in state.world().table::<Position>().iter() {
        if state.world().has::<Collidable>(id) && !seen.insert(*pos) {
            overlaps += 1;
        }
    }
    overlaps
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn random_play_preserves_board_invariants(
        (w, h, cells, agent_at) in board_strategy(),
        actions in prop::collection::vec(action_strategy(), 1..40),
        movement in movement_strategy(),
        seed in any::<u64>(),
    ) {
        let (initial, agent) = build_state(w, h, &cells, agent_at, seed);
        let movement = movement_by_name(movement).unwrap();
        let initial = initial.with_movement(movement);
        let entity_count = initial.world().entity_count();
        let placed = initial.world().table::<Position>().len();

        let mut state = initial.clone();
        for action in actions {
            let before = state.capture_snapshot();
            let next = step(&state, action, agent);

            // Input untouched.
            prop_assert_eq!(state.capture_snapshot(), before);
            // Same action on the same state gives the same result.
            prop_assert_eq!(&step(&state, action, agent), &next);

            prop_assert!(next.world().validate().is_ok());
            prop_assert_eq!(next.world().entity_count(), entity_count);
            prop_assert_eq!(next.world().table::<Position>().len(), placed);
            for (_, pos) in next.world().table::<Position>().iter() {
                prop_assert!(next.in_bounds(*pos), "{:?} left the grid", pos);
            }
            prop_assert_eq!(collidable_overlaps(&next), 0);

            // Walls never move.
            for id in next.world().table::<Blocking>().ids() {
                prop_assert_eq!(next.position_of(id), initial.position_of(id));
            }

            state = next;
        }
    }

    #[test]
    fn each_step_moves_entities_at_most_one_push(
        (w, h, cells, agent_at) in board_strategy(),
        action in action_strategy(),
    ) {
        let (state, agent) = build_state(w, h, &cells, agent_at, 0);
        let (next, report) = step_with_report(&state, action, agent);

        if report.moved {
            for d in &report.displaced {
                prop_assert_eq!(d.from.x.abs_diff(d.to.x) + d.from.y.abs_diff(d.to.y), 1);
                prop_assert_eq!(next.position_of(d.entity), Some(d.to));
            }
        } else {
            prop_assert_eq!(&next, &state);
            prop_assert!(report.displaced.is_empty());
        }
    }

    #[test]
    fn wrap_movement_keeps_agent_moving(
        (w, h, _cells, agent_at) in board_strategy(),
        action in action_strategy(),
    ) {
        let (state, agent) = build_state(w, h, &[], agent_at, 0);
        let state = state.with_movement(Arc::new(WrapMovement));
        let next = step(&state, action, agent);
        let pos = next.position_of(agent).unwrap();
        prop_assert!(next.in_bounds(pos));
        if action == Action::Wait {
            prop_assert_eq!(pos, Position::from(agent_at));
        }
    }
}
