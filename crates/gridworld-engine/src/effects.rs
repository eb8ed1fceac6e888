//! Gameplay effects applied by drivers between steps.
//!
//! Effects are separate from [`step`](crate::step::step): the step engine
//! only moves entities, and a driver decides when to run an effect on the
//! state it gets back. Like `step`, every effect returns a new state and
//! leaves its input alone.

use gridworld_ecs::prelude::*;

use crate::state::State;

/// Pick up every collectible sharing `agent`'s cell.
///
/// Picked-up entities lose their `Position` and are added to the agent's
/// `Inventory` (created if the agent has none). Nothing is spawned or
/// despawned. An agent that is not on the board collects nothing.
pub fn collect(state: &State, agent: EntityId) -> State {
    let Some(cell) = state.position_of(agent) else {
        return state.clone();
    };
    let found: Vec<EntityId> = state
        .world()
        .entities_at(cell)
        .into_iter()
        .filter(|&id| id != agent && state.world().has::<Collectible>(id))
        .collect();
    if found.is_empty() {
        return state.clone();
    }

    let mut next = state.clone();
    let mut inventory = next.world().get::<Inventory>(agent).cloned().unwrap_or_default();
    for &item in &found {
        next.world_mut().remove::<Position>(item);
        inventory.items.insert(item);
    }
    next.world_mut().table_mut::<Inventory>().insert(agent, inventory);

    tracing::debug!(agent = %agent, cell = ?cell, items = ?found, "collected items");
    next
}
