//! Objective predicates.
//!
//! An [`ObjectiveFn`] classifies a state as ongoing, won or lost. Drivers
//! call it after each step (see [`State::outcome`]); the step engine itself
//! never does.

use std::sync::Arc;

use gridworld_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::state::State;

/// Result of evaluating an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// A pure predicate over a state.
pub trait ObjectiveFn: Send + Sync {
    /// Stable name, stored in snapshots and resolved by [`objective_by_name`].
    fn name(&self) -> &'static str;

    fn evaluate(&self, state: &State) -> Outcome;
}

fn placed_agents(state: &State) -> impl Iterator<Item = Position> + '_ {
    state
        .world()
        .table::<Agent>()
        .ids()
        .filter_map(|id| state.position_of(id))
}

fn any_agent_on_exit(state: &State) -> bool {
    let exits = state.world().table::<Exit>();
    placed_agents(state).any(|cell| {
        state
            .world()
            .entities_at(cell)
            .into_iter()
            .any(|id| exits.contains(id))
    })
}

fn collectibles_on_board(state: &State) -> bool {
    state
        .world()
        .table::<Collectible>()
        .ids()
        .any(|id| state.position_of(id).is_some())
}

/// Shared rule: with no agent left on the board the episode is lost.
fn evaluate_with(state: &State, won: impl FnOnce(&State) -> bool) -> Outcome {
    if placed_agents(state).next().is_none() {
        Outcome::Lost
    } else if won(state) {
        Outcome::Won
    } else {
        Outcome::Ongoing
    }
}

/// Won once every collectible is off the board and an agent stands on an exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjective;

impl ObjectiveFn for DefaultObjective {
    fn name(&self) -> &'static str {
        "default"
    }

    fn evaluate(&self, state: &State) -> Outcome {
        evaluate_with(state, |s| !collectibles_on_board(s) && any_agent_on_exit(s))
    }
}

/// Won as soon as an agent stands on an exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitObjective;

impl ObjectiveFn for ExitObjective {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn evaluate(&self, state: &State) -> Outcome {
        evaluate_with(state, any_agent_on_exit)
    }
}

/// Won once every collectible is off the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectObjective;

impl ObjectiveFn for CollectObjective {
    fn name(&self) -> &'static str {
        "collect"
    }

    fn evaluate(&self, state: &State) -> Outcome {
        evaluate_with(state, |s| !collectibles_on_board(s))
    }
}

/// Resolve an objective from its [`ObjectiveFn::name`].
pub fn objective_by_name(name: &str) -> Option<Arc<dyn ObjectiveFn>> {
    let objective: Arc<dyn ObjectiveFn> = match name {
        "default" => Arc::new(DefaultObjective),
        "exit" => Arc::new(ExitObjective),
        "collect" => Arc::new(CollectObjective),
        _ => return None,
    };
    Some(objective)
}
