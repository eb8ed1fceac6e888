//! Gridworld Engine -- deterministic step function for grid puzzles.
//!
//! This crate builds on [`gridworld_ecs`] to provide the transition function
//! of a discrete grid world: given an immutable [`State`](state::State), one
//! [`Action`](action::Action) and the acting entity, [`step`](step::step)
//! returns the next state. Moves are proposed by a pluggable movement
//! strategy, checked against blocking entities, and may shove chains of
//! pushable entities.
//!
//! Around the step function sit the pieces a driver needs: objective
//! predicates, the `collect` effect, an ASCII level loader, hashed snapshots
//! and deterministic replay.
//!
//! # Quick Start
//!
//! ```
//! use gridworld_engine::prelude::*;
//!
//! let level = parse_level("#####\n#AB.E\n#####", GridConfig::default()).unwrap();
//! let agent = level.agent().unwrap();
//!
//! let state = step(&level.state, Action::Right, agent);
//! assert_eq!(state.position_of(agent), Some(Position::new(2, 1)));
//!
//! // The box ahead is now against the exit; one more push moves it onto it.
//! let state = step(&state, Action::Right, agent);
//! assert_eq!(state.position_of(agent), Some(Position::new(3, 1)));
//! assert_eq!(state.outcome(), Outcome::Ongoing);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod collision;
pub mod config;
pub mod effects;
pub mod level;
pub mod movement;
pub mod objective;
pub mod push;
pub mod replay;
pub mod snapshot;
pub mod state;
pub mod step;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use gridworld_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or loading states.
///
/// Gameplay never produces an error: a blocked move is a no-op.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Width or height is not positive.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// The level text has no rows.
    #[error("level contains no rows")]
    EmptyLevel,

    /// A level row differs in length from the first row.
    #[error("level row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A level glyph is not recognised.
    #[error("unknown level glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error(transparent)]
    Ecs(#[from] gridworld_ecs::EcsError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use gridworld_ecs::prelude::*;

    pub use crate::action::Action;
    pub use crate::collision::{classify, classify_entity, CellContents, Occupant};
    pub use crate::config::GridConfig;
    pub use crate::effects::collect;
    pub use crate::level::{parse_level, Level};
    pub use crate::movement::{
        movement_by_name, DefaultMovement, MirrorMovement, MovementFn, SlipperyMovement,
        WindyMovement, WrapMovement,
    };
    pub use crate::objective::{
        objective_by_name, CollectObjective, DefaultObjective, ExitObjective, ObjectiveFn,
        Outcome,
    };
    pub use crate::push::{apply_displacements, resolve_push_chain, Displacement};
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::snapshot::StateSnapshot;
    pub use crate::state::State;
    pub use crate::step::{step, step_with_report, StepReport};
    pub use crate::EngineError;
}
