//! The single-step transition function.
//!
//! [`step`] takes a [`State`], one [`Action`] and the acting entity, and
//! returns the next `State`:
//!
//! 1. If the actor has no `Position`, the input is returned unchanged.
//! 2. The state's movement strategy proposes candidate cells, in order.
//! 3. Each candidate is checked: out-of-bounds cells are skipped, and the
//!    push chain starting at the cell is resolved along the candidate's
//!    heading. Other collidable agents count as obstructions; the actor
//!    itself never does.
//! 4. The first candidate that resolves is committed: the actor moves there
//!    and every pushed entity moves one cell along the heading, all in the
//!    returned state. If none resolves, nothing moves.
//!
//! Only the position table is ever rewritten. Every other table in the
//! returned state shares storage with the input, and the input is never
//! touched. A blocked move is an ordinary outcome, not an error.
//!
//! # Example
//!
//! ```
//! use gridworld_engine::prelude::*;
//!
//! let mut world = World::new();
//! let agent = world.spawn_bundle(
//!     ComponentBundle::new().with(Position::new(0, 0)).with(Agent).with(Collidable),
//! );
//! let crate_box = world.spawn_bundle(
//!     ComponentBundle::new().with(Position::new(1, 0)).with(Pushable).with(Collidable),
//! );
//! let state = State::new(GridConfig::new(5, 1), world).unwrap();
//!
//! let next = step(&state, Action::Right, agent);
//! assert_eq!(next.position_of(agent), Some(Position::new(1, 0)));
//! assert_eq!(next.position_of(crate_box), Some(Position::new(2, 0)));
//!
//! // The input state is untouched.
//! assert_eq!(state.position_of(agent), Some(Position::new(0, 0)));
//! ```

use gridworld_ecs::prelude::*;

use crate::action::Action;
use crate::push::{apply_displacements, resolve_push_chain, Displacement};
use crate::state::State;

// ---------------------------------------------------------------------------
// StepReport
// ---------------------------------------------------------------------------

/// What happened during one [`step_with_report`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Whether a candidate was committed.
    pub moved: bool,
    /// Actor's cell before the step; `None` if it was not on the board.
    pub from: Option<Position>,
    /// Actor's cell after the step; `None` if it was not on the board.
    pub to: Option<Position>,
    /// Index of the committed candidate in the strategy's list.
    pub candidate_index: Option<usize>,
    /// Entities shoved by the actor.
    pub displaced: Vec<Displacement>,
}

// ---------------------------------------------------------------------------
// step
// ---------------------------------------------------------------------------

/// Advance `state` by one action of `agent_id`.
///
/// See the [module documentation](self) for the resolution rules.
pub fn step(state: &State, action: Action, agent_id: EntityId) -> State {
    step_with_report(state, action, agent_id).0
}

/// [`step`], also returning a [`StepReport`] describing the outcome.
pub fn step_with_report(state: &State, action: Action, agent_id: EntityId) -> (State, StepReport) {
    let span = tracing::debug_span!("step", agent = %agent_id, action = ?action);
    let _enter = span.enter();

    let Some(from) = state.position_of(agent_id) else {
        tracing::debug!("actor is not on the board -- step is a no-op");
        return (state.clone(), StepReport::default());
    };

    let movement = state.movement();
    let candidates = movement.candidates(state, agent_id, action);

    for (index, target) in candidates.iter().copied().enumerate() {
        if !state.in_bounds(target) {
            tracing::trace!(candidate = index, target = ?target, "candidate is out of bounds");
            continue;
        }
        let heading = movement.heading(action, from, target);
        let Some(displaced) = resolve_push_chain(state, target, heading, Some(agent_id)) else {
            tracing::trace!(candidate = index, target = ?target, "candidate is obstructed");
            continue;
        };

        let mut next = state.clone();
        next.world_mut().table_mut::<Position>().insert(agent_id, target);
        apply_displacements(next.world_mut(), &displaced);

        tracing::debug!(
            from = ?from,
            to = ?target,
            candidate = index,
            pushed = displaced.len(),
            "actor moved"
        );
        let report = StepReport {
            moved: true,
            from: Some(from),
            to: Some(target),
            candidate_index: Some(index),
            displaced,
        };
        return (next, report);
    }

    tracing::debug!(
        at = ?from,
        candidates = candidates.len(),
        "no candidate resolved -- actor stays put"
    );
    let report = StepReport {
        moved: false,
        from: Some(from),
        to: Some(from),
        candidate_index: None,
        displaced: Vec::new(),
    };
    (state.clone(), report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
