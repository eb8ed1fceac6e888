//! Cell occupancy classification.
//!
//! Every entity standing on a cell falls into exactly one class:
//!
//! | class      | rule                                                        |
//! |------------|-------------------------------------------------------------|
//! | blocking   | has `Blocking`, or is `Collidable` but not `Pushable`        |
//! | pushable   | has both `Pushable` and `Collidable` (and no `Blocking`)     |
//! | passive    | everything else, e.g. `Collectible` or `Exit` only           |
//!
//! The acting entity is never counted at its own cell. Other agents are
//! collidable and therefore blocking. A cell that holds both a blocking and a
//! pushable entity obstructs: blocking wins.

use gridworld_ecs::prelude::*;

use crate::state::State;

/// How one entity at a cell relates to a mover entering that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Blocking,
    Pushable,
    Passive,
}

/// Classify a single entity, ignoring where it stands.
pub fn classify_entity(world: &World, id: EntityId) -> Occupant {
    if world.has::<Blocking>(id) {
        Occupant::Blocking
    } else if world.has::<Collidable>(id) {
        if world.has::<Pushable>(id) {
            Occupant::Pushable
        } else {
            Occupant::Blocking
        }
    } else {
        Occupant::Passive
    }
}

/// Entities at one cell, grouped by [`Occupant`] class, each list sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellContents {
    pub blocking: Vec<EntityId>,
    pub pushable: Vec<EntityId>,
    pub passive: Vec<EntityId>,
}

impl CellContents {
    /// At least one entity that can never be entered or displaced.
    pub fn is_blocked(&self) -> bool {
        !self.blocking.is_empty()
    }

    pub fn has_pushable(&self) -> bool {
        !self.pushable.is_empty()
    }

    /// Enterable without pushing anything.
    pub fn is_clear(&self) -> bool {
        self.blocking.is_empty() && self.pushable.is_empty()
    }
}

/// Classify everything at `cell`, skipping `mover`.
///
/// Cells outside the grid are not special here; bounds are the caller's
/// concern.
pub fn classify(state: &State, cell: Position, mover: Option<EntityId>) -> CellContents {
    let mut contents = CellContents::default();
    for id in state.world().entities_at(cell) {
        if Some(id) == mover {
            continue;
        }
        match classify_entity(state.world(), id) {
            Occupant::Blocking => contents.blocking.push(id),
            Occupant::Pushable => contents.pushable.push(id),
            Occupant::Passive => contents.passive.push(id),
        }
    }
    contents
}
