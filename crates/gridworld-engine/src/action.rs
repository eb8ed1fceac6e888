//! Player actions.

use gridworld_ecs::component::Direction;
use serde::{Deserialize, Serialize};

/// One player action per step.
///
/// The engine never interprets an action itself; the state's
/// [`MovementFn`](crate::movement::MovementFn) decides what cells an action
/// proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Wait,
}

impl Action {
    /// The four directional actions.
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Unit direction of the action; [`Direction::NONE`] for `Wait`.
    pub const fn direction(self) -> Direction {
        match self {
            Action::Up => Direction::UP,
            Action::Down => Direction::DOWN,
            Action::Left => Direction::LEFT,
            Action::Right => Direction::RIGHT,
            Action::Wait => Direction::NONE,
        }
    }

    pub const fn is_move(self) -> bool {
        !matches!(self, Action::Wait)
    }
}
