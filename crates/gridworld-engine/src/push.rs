//! Push-chain resolution.
//!
//! Entering a cell that holds pushable entities means shoving them one cell
//! further along the same heading, which may in turn shove whatever is there,
//! and so on. The chain is resolved with an explicit loop over cells rather
//! than recursion, and is all-or-nothing: either every entity in the chain
//! gets a [`Displacement`], or the push fails and nothing moves.

use gridworld_ecs::prelude::*;

use crate::collision::classify;
use crate::state::State;

/// One entity relocation produced by a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub entity: EntityId,
    pub from: Position,
    pub to: Position,
}

/// Work out what must move for `mover` to enter `cell` travelling along
/// `heading`.
///
/// Returns `Some(displacements)` (empty when `cell` holds nothing pushable)
/// or `None` when the cell is obstructed. Every pushable entity on a cell in
/// the chain moves together. The walk is bounded by the grid's larger
/// dimension: a straight in-bounds chain can never be longer.
///
/// `cell` itself is not bounds-checked; that is the caller's job. Every cell
/// a pushed entity would land on is.
pub fn resolve_push_chain(
    state: &State,
    cell: Position,
    heading: Direction,
    mover: Option<EntityId>,
) -> Option<Vec<Displacement>> {
    let limit = state.width().max(state.height()) as usize + 1;
    let mut displacements = Vec::new();
    let mut current = cell;

    for _ in 0..limit {
        let contents = classify(state, current, mover);
        if contents.is_blocked() {
            tracing::trace!(cell = ?current, blockers = ?contents.blocking, "push chain hit a blocker");
            return None;
        }
        if !contents.has_pushable() {
            return Some(displacements);
        }
        if heading.is_none() {
            return None;
        }
        let next = current.offset(heading);
        if !state.in_bounds(next) {
            tracing::trace!(cell = ?current, "push chain would leave the grid");
            return None;
        }
        displacements.extend(contents.pushable.iter().map(|&entity| Displacement {
            entity,
            from: current,
            to: next,
        }));
        current = next;
    }

    None
}

/// Write every displacement into `world`'s position table.
///
/// Entities that have lost their `Position` in the meantime are skipped, so
/// this never places an entity that was not on the board.
pub fn apply_displacements(world: &mut World, displacements: &[Displacement]) {
    let positions = world.table_mut::<Position>();
    for d in displacements {
        if let Some(pos) = positions.get_mut(d.entity) {
            *pos = d.to;
        }
    }
}
