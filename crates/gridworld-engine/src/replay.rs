//! Deterministic replay with action recording and hash verification.
//!
//! A [`ReplayRecorder`] captures the initial [`StateSnapshot`] and, for every
//! step, the acting entity, its action and the hash of the resulting state.
//! [`replay`] restores the snapshot, feeds the recorded actions back through
//! [`step`] and compares hashes turn by turn.
//!
//! Only calls to [`step`] are replayed. A driver that also applies effects
//! between steps will see those turns reported as divergent.
//!
//! # Recording and replaying
//!
//! ```
//! use gridworld_engine::prelude::*;
//!
//! let level = parse_level("A.B..", GridConfig::default()).unwrap();
//! let agent = level.agent().unwrap();
//!
//! let mut recorder = ReplayRecorder::new(&level.state);
//! let mut state = level.state.clone();
//! for action in [Action::Right, Action::Right, Action::Up] {
//!     state = recorder.record_step(&state, action, agent);
//! }
//! let log = recorder.finish();
//!
//! let result = replay(&log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(result.final_hash, state.state_hash());
//! ```

use gridworld_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::snapshot::StateSnapshot;
use crate::state::State;
use crate::step::step;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A complete replay log: initial snapshot plus one entry per step.
///
/// The log is fully serializable to JSON for storage or regression fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Replay begins by restoring this snapshot.
    pub initial_snapshot: StateSnapshot,
    /// Steps in the order they were taken.
    pub entries: Vec<ReplayEntry>,
}

// ---------------------------------------------------------------------------
// ReplayEntry
// ---------------------------------------------------------------------------

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Zero-based position of this step in the log.
    pub turn: u64,
    pub agent: EntityId,
    pub action: Action,
    /// BLAKE3 hex digest of the state *after* the step.
    pub state_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of replaying a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every recorded turn was replayed without divergence.
    pub completed: bool,
    /// Turns replayed before stopping.
    pub turns_replayed: u64,
    /// Hash of the last state reached.
    pub final_hash: String,
    /// The first turn whose hash did not match. `None` if all matched.
    pub first_divergence: Option<ReplayDivergence>,
}

// ---------------------------------------------------------------------------
// ReplayDivergence
// ---------------------------------------------------------------------------

/// Details about a determinism failure detected during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub turn: u64,
    /// The hash recorded in the log.
    pub expected_hash: String,
    /// The hash computed during replay.
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Records a sequence of steps into a [`ReplayLog`].
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    log: ReplayLog,
}

impl ReplayRecorder {
    /// Start recording from `initial`.
    pub fn new(initial: &State) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: initial.capture_snapshot(),
                entries: Vec::new(),
            },
        }
    }

    /// Record a step that was taken elsewhere, given the hash of its result.
    pub fn record(&mut self, agent: EntityId, action: Action, state_hash: String) {
        let turn = self.log.entries.len() as u64;
        self.log.entries.push(ReplayEntry {
            turn,
            agent,
            action,
            state_hash,
        });
    }

    /// Run [`step`] and record it. Returns the new state.
    pub fn record_step(&mut self, state: &State, action: Action, agent: EntityId) -> State {
        let next = step(state, action, agent);
        self.record(agent, action, next.state_hash());
        next
    }

    /// Number of turns recorded so far.
    pub fn turns(&self) -> u64 {
        self.log.entries.len() as u64
    }

    /// Finish recording and return the completed [`ReplayLog`].
    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay a [`ReplayLog`], verifying the state hash after every turn.
///
/// Replay stops at the first divergence and reports how far it got.
///
/// # Errors
///
/// Returns an error if the entries are not numbered `0, 1, 2, ...` in order,
/// or if the initial snapshot cannot be restored. Both are checked before any
/// step runs.
pub fn replay(log: &ReplayLog) -> Result<ReplayResult, anyhow::Error> {
    for (expected, entry) in log.entries.iter().enumerate() {
        if entry.turn != expected as u64 {
            return Err(anyhow::anyhow!(
                "replay log entry {expected} is numbered turn {}; turns must be consecutive from 0",
                entry.turn
            ));
        }
    }

    let mut state = State::restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    let mut turns_replayed: u64 = 0;
    let mut final_hash = log.initial_snapshot.hash.clone();

    for entry in &log.entries {
        state = step(&state, entry.action, entry.agent);
        let actual_hash = state.state_hash();
        if actual_hash != entry.state_hash {
            tracing::warn!(
                turn = entry.turn,
                expected = %entry.state_hash,
                actual = %actual_hash,
                "replay diverged"
            );
            return Ok(ReplayResult {
                completed: false,
                turns_replayed,
                final_hash: actual_hash.clone(),
                first_divergence: Some(ReplayDivergence {
                    turn: entry.turn,
                    expected_hash: entry.state_hash.clone(),
                    actual_hash,
                }),
            });
        }
        final_hash = actual_hash;
        turns_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        turns_replayed,
        final_hash,
        first_divergence: None,
    })
}
