//! State snapshot and restore with BLAKE3 hashing.
//!
//! Provides [`StateSnapshot`] -- a serializable representation of a full
//! [`State`] (dimensions, seed, strategy names, ECS world) with a BLAKE3
//! content hash for integrity verification and determinism testing.
//!
//! # Usage
//!
//! ```
//! use gridworld_engine::prelude::*;
//!
//! let level = parse_level("A.B.", GridConfig::default()).unwrap();
//! let agent = level.agent().unwrap();
//! let state = step(&level.state, Action::Right, agent);
//!
//! let snapshot = state.capture_snapshot();
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//!
//! let json = serde_json::to_string(&snapshot).unwrap();
//! let back: StateSnapshot = serde_json::from_str(&json).unwrap();
//! let restored = State::restore_from_snapshot(&back).unwrap();
//! assert_eq!(restored, state);
//! assert_eq!(restored.state_hash(), state.state_hash());
//! ```
//!
//! # What Is NOT Serialized
//!
//! Strategies are stored by name only. Restore resolves them with
//! [`movement_by_name`] and [`objective_by_name`], so custom strategies and
//! strategy parameters (such as a non-default gust chance) must be
//! re-attached by the caller.

use gridworld_ecs::snapshot::WorldSnapshot;
use gridworld_ecs::world::World;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::movement::movement_by_name;
use crate::objective::objective_by_name;
use crate::state::State;

// ---------------------------------------------------------------------------
// StateSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of a [`State`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    /// Name of the movement strategy.
    pub movement: String,
    /// Name of the objective predicate.
    pub objective: String,
    /// Complete ECS world (entities, components, allocator).
    pub world: WorldSnapshot,
    /// BLAKE3 hex digest (64 lowercase hex chars) of every other field.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// Compute the BLAKE3 hex digest of the hashable state.
///
/// The hash field itself is NOT included (it is derived).
fn compute_hash(
    width: i32,
    height: i32,
    seed: u64,
    movement: &str,
    objective: &str,
    world: &WorldSnapshot,
) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        width: i32,
        height: i32,
        seed: u64,
        movement: &'a str,
        objective: &'a str,
        world: &'a WorldSnapshot,
    }

    let hashable = HashableState {
        width,
        height,
        seed,
        movement,
        objective,
        world,
    };

    let json_bytes = serde_json::to_vec(&hashable)
        .expect("StateSnapshot fields should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// State snapshot/restore methods
// ---------------------------------------------------------------------------

impl State {
    /// Capture a complete snapshot of this state.
    ///
    /// Equal states always produce equal snapshots, byte for byte once
    /// serialized.
    pub fn capture_snapshot(&self) -> StateSnapshot {
        let world = self.world().capture_snapshot();
        let movement = self.movement().name().to_owned();
        let objective = self.objective().name().to_owned();
        let hash = compute_hash(
            self.width(),
            self.height(),
            self.seed(),
            &movement,
            &objective,
            &world,
        );

        StateSnapshot {
            width: self.width(),
            height: self.height(),
            seed: self.seed(),
            movement,
            objective,
            world,
            hash,
        }
    }

    /// Compute the BLAKE3 state hash.
    ///
    /// Equivalent to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        self.capture_snapshot().hash
    }

    /// Build a state from a previously captured snapshot.
    ///
    /// The hash is recomputed and checked before anything is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash does not match (corruption/tampering), a
    /// strategy name is unknown, the dimensions are invalid, or the world
    /// cannot be restored.
    pub fn restore_from_snapshot(snapshot: &StateSnapshot) -> Result<State, anyhow::Error> {
        let expected_hash = compute_hash(
            snapshot.width,
            snapshot.height,
            snapshot.seed,
            &snapshot.movement,
            &snapshot.objective,
            &snapshot.world,
        );
        if expected_hash != snapshot.hash {
            tracing::warn!(
                recorded = %snapshot.hash,
                recomputed = %expected_hash,
                "rejecting snapshot with mismatched hash"
            );
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected_hash
            ));
        }

        let movement = movement_by_name(&snapshot.movement).ok_or_else(|| {
            anyhow::anyhow!("snapshot names unknown movement strategy '{}'", snapshot.movement)
        })?;
        let objective = objective_by_name(&snapshot.objective).ok_or_else(|| {
            anyhow::anyhow!("snapshot names unknown objective '{}'", snapshot.objective)
        })?;

        let world = World::restore_from_snapshot(&snapshot.world)
            .map_err(|e| anyhow::anyhow!("failed to restore world from snapshot: {e}"))?;

        let config = GridConfig {
            width: snapshot.width,
            height: snapshot.height,
            seed: snapshot.seed,
        };
        let state = State::new(config, world)
            .map_err(|e| anyhow::anyhow!("snapshot does not describe a valid state: {e}"))?;
        Ok(state.with_movement(movement).with_objective(objective))
    }
}
