//! Integration tests for the deterministic replay system.
//!
//! These tests validate recording, replaying, divergence detection, and
//! JSON serialization of [`ReplayLog`].

use std::sync::Arc;

use gridworld_engine::prelude::*;

const PUZZLE: &str = "
#######
#A.B..#
#..B..#
#.C..E#
#######
";

fn record(state: &State, agent: EntityId, actions: &[Action]) -> (ReplayLog, State) {
    let mut recorder = ReplayRecorder::new(state);
    let mut current = state.clone();
    for &action in actions {
        current = recorder.record_step(&current, action, agent);
    }
    (recorder.finish(), current)
}

const ROUTE: [Action; 8] = [
    Action::Right,
    Action::Right,
    Action::Down,
    Action::Left,
    Action::Down,
    Action::Right,
    Action::Wait,
    Action::Up,
];

#[test]
fn replay_reproduces_final_state() {
    let level = parse_level(PUZZLE, GridConfig::default()).unwrap();
    let agent = level.agent().unwrap();
    let (log, last) = record(&level.state, agent, &ROUTE);
    assert_eq!(log.entries.len(), ROUTE.len());

    let result = replay(&log).unwrap();
    assert!(result.completed);
    assert_eq!(result.turns_replayed, ROUTE.len() as u64);
    assert_eq!(result.final_hash, last.state_hash());
}

#[test]
fn replay_log_survives_json() {
    let level = parse_level(PUZZLE, GridConfig::default()).unwrap();
    let agent = level.agent().unwrap();
    let (log, _) = record(&level.state, agent, &ROUTE);

    let json = serde_json::to_string_pretty(&log).unwrap();
    assert!(json.contains("\"action\": \"right\""));
    let back: ReplayLog = serde_json::from_str(&json).unwrap();
    assert_eq!(back, log);
    assert!(replay(&back).unwrap().completed);
}

#[test]
fn windy_replay_is_deterministic() {
    let level = parse_level(PUZZLE, GridConfig::default().with_seed(2024)).unwrap();
    let agent = level.agent().unwrap();
    let state = level.state.with_movement(Arc::new(WindyMovement::default()));

    let (log, last) = record(&state, agent, &ROUTE);
    assert_eq!(log.initial_snapshot.movement, "windy");
    let result = replay(&log).unwrap();
    assert!(result.completed);
    assert_eq!(result.final_hash, last.state_hash());
}

#[test]
fn replay_detects_divergent_action() {
    let level = parse_level(PUZZLE, GridConfig::default()).unwrap();
    let agent = level.agent().unwrap();
    let (mut log, _) = record(&level.state, agent, &ROUTE);

    // Turn 0 moved the agent right; claim it went down instead.
    log.entries[0].action = Action::Down;
    let result = replay(&log).unwrap();
    assert!(!result.completed);
    assert_eq!(result.turns_replayed, 0);
    let divergence = result.first_divergence.unwrap();
    assert_eq!(divergence.turn, 0);
    assert_ne!(divergence.expected_hash, divergence.actual_hash);
}

#[test]
fn effects_outside_step_show_up_as_divergence() {
    // Stepping onto the coin and collecting it changes the state in a way
    // replay cannot reproduce.
    let level = parse_level("A.C.", GridConfig::default()).unwrap();
    let agent = level.agent().unwrap();
    let mut recorder = ReplayRecorder::new(&level.state);
    let mut state = level.state.clone();
    for _ in 0..2 {
        state = collect(&step(&state, Action::Right, agent), agent);
        recorder.record(agent, Action::Right, state.state_hash());
    }
    let result = replay(&recorder.finish()).unwrap();
    assert_eq!(result.first_divergence.map(|d| d.turn), Some(1));
}

#[test]
fn corrupt_initial_snapshot_is_an_error() {
    let level = parse_level(PUZZLE, GridConfig::default()).unwrap();
    let agent = level.agent().unwrap();
    let (mut log, _) = record(&level.state, agent, &ROUTE);
    log.initial_snapshot.seed += 1;
    let err = replay(&log).unwrap_err();
    assert!(err.to_string().contains("initial snapshot"));
}
