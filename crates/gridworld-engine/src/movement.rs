//! Movement-delta strategies.
//!
//! A [`MovementFn`] turns an action into an ordered list of candidate target
//! cells for an entity. The step engine tries the candidates in order and
//! commits to the first one that resolves; it never looks at which strategy
//! produced them. Strategies only ever read the state.

use std::sync::Arc;

use gridworld_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::action::Action;
use crate::collision::classify;
use crate::state::State;

/// Maps `(state, entity, action)` to candidate target cells.
pub trait MovementFn: Send + Sync {
    /// Stable name, stored in snapshots and resolved by [`movement_by_name`].
    fn name(&self) -> &'static str;

    /// Candidate targets, most preferred first. Empty means "no move".
    ///
    /// Only called for entities that have a `Position`.
    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position>;

    /// The one-cell direction used to push whatever sits on `to`.
    fn heading(&self, _action: Action, from: Position, to: Position) -> Direction {
        Direction::unit_towards(from, to)
    }
}

// ---------------------------------------------------------------------------
// DefaultMovement
// ---------------------------------------------------------------------------

/// One cell in the action's direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMovement;

impl MovementFn for DefaultMovement {
    fn name(&self) -> &'static str {
        "default"
    }

    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position> {
        match state.position_of(entity) {
            Some(pos) if action.is_move() => vec![pos.offset(action.direction())],
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// WrapMovement
// ---------------------------------------------------------------------------

/// One cell, wrapping around the grid edges (toroidal grid).
///
/// The wrapped candidate is always in bounds. Pushes still follow the
/// action's direction and do not wrap.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapMovement;

impl MovementFn for WrapMovement {
    fn name(&self) -> &'static str {
        "wrap"
    }

    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position> {
        match state.position_of(entity) {
            Some(pos) if action.is_move() => {
                let next = pos.offset(action.direction());
                vec![Position::new(
                    next.x.rem_euclid(state.width()),
                    next.y.rem_euclid(state.height()),
                )]
            }
            _ => Vec::new(),
        }
    }

    fn heading(&self, action: Action, _from: Position, _to: Position) -> Direction {
        action.direction()
    }
}

// ---------------------------------------------------------------------------
// MirrorMovement
// ---------------------------------------------------------------------------

/// One cell in the opposite direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorMovement;

impl MovementFn for MirrorMovement {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position> {
        match state.position_of(entity) {
            Some(pos) if action.is_move() => vec![pos.offset(action.direction().reversed())],
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SlipperyMovement
// ---------------------------------------------------------------------------

/// Slide along the action's direction until something is in the way.
///
/// Candidates run from the farthest clear cell back to the adjacent one. If
/// the adjacent cell is not clear it is the only candidate, so a slide that
/// starts against a crate becomes an ordinary push.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlipperyMovement;

impl MovementFn for SlipperyMovement {
    fn name(&self) -> &'static str {
        "slippery"
    }

    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position> {
        let Some(start) = state.position_of(entity) else {
            return Vec::new();
        };
        if !action.is_move() {
            return Vec::new();
        }
        let dir = action.direction();

        let mut path = Vec::new();
        let mut current = start;
        loop {
            let next = current.offset(dir);
            if !state.in_bounds(next) || !classify(state, next, Some(entity)).is_clear() {
                break;
            }
            path.push(next);
            current = next;
        }

        if path.is_empty() {
            return vec![start.offset(dir)];
        }
        path.reverse();
        path
    }
}

// ---------------------------------------------------------------------------
// WindyMovement
// ---------------------------------------------------------------------------

/// One cell, but a gust sometimes blows the entity in a random direction.
///
/// When a gust fires, the blown cell is tried first and the intended cell is
/// the fallback. The gust is drawn from a PCG generator seeded by the state
/// seed, the entity id and its current cell, so for a given state the result
/// is always the same.
#[derive(Debug, Clone, Copy)]
pub struct WindyMovement {
    /// Probability in `[0, 1]` that a gust fires on a move.
    pub gust_chance: f64,
}

impl WindyMovement {
    pub const DEFAULT_GUST_CHANCE: f64 = 0.25;

    fn rng_for(state: &State, entity: EntityId, pos: Position) -> Pcg64 {
        let cell = (u64::from(pos.x as u32) << 32) | u64::from(pos.y as u32);
        let seed = state.seed()
            ^ entity.to_raw().wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ cell.rotate_left(17);
        Pcg64::seed_from_u64(seed)
    }
}

impl Default for WindyMovement {
    fn default() -> Self {
        Self {
            gust_chance: Self::DEFAULT_GUST_CHANCE,
        }
    }
}

impl MovementFn for WindyMovement {
    fn name(&self) -> &'static str {
        "windy"
    }

    fn candidates(&self, state: &State, entity: EntityId, action: Action) -> Vec<Position> {
        let Some(pos) = state.position_of(entity) else {
            return Vec::new();
        };
        if !action.is_move() {
            return Vec::new();
        }
        let intended = pos.offset(action.direction());

        let mut rng = Self::rng_for(state, entity, pos);
        if self.gust_chance > 0.0 && rng.gen_bool(self.gust_chance.min(1.0)) {
            let gust = Action::MOVES[rng.gen_range(0..Action::MOVES.len())];
            let blown = pos.offset(gust.direction());
            if blown != intended {
                tracing::trace!(entity = %entity, gust = ?gust, "gust changes the move");
                return vec![blown, intended];
            }
        }
        vec![intended]
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Resolve a strategy from its [`MovementFn::name`].
///
/// `windy` resolves with [`WindyMovement::DEFAULT_GUST_CHANCE`].
pub fn movement_by_name(name: &str) -> Option<Arc<dyn MovementFn>> {
    let movement: Arc<dyn MovementFn> = match name {
        "default" => Arc::new(DefaultMovement),
        "wrap" => Arc::new(WrapMovement),
        "mirror" => Arc::new(MirrorMovement),
        "slippery" => Arc::new(SlipperyMovement),
        "windy" => Arc::new(WindyMovement::default()),
        _ => return None,
    };
    Some(movement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn state_with_agent_at(x: i32, y: i32) -> (State, EntityId) {
        let mut world = World::new();
        let agent = world.spawn_bundle(
            ComponentBundle::new()
                .with(Position::new(x, y))
                .with(Agent)
                .with(Collidable),
        );
        (State::new(GridConfig::new(5, 5), world).unwrap(), agent)
    }

    #[test]
    fn default_moves_one_cell() {
        let (state, agent) = state_with_agent_at(2, 2);
        assert_eq!(
            DefaultMovement.candidates(&state, agent, Action::Up),
            vec![Position::new(2, 1)]
        );
        assert!(DefaultMovement.candidates(&state, agent, Action::Wait).is_empty());
    }

    #[test]
    fn strategies_return_nothing_without_position() {
        let (state, _) = state_with_agent_at(0, 0);
        let ghost = EntityId::new(999);
        for name in ["default", "wrap", "mirror", "slippery", "windy"] {
            let movement = movement_by_name(name).unwrap();
            assert!(movement.candidates(&state, ghost, Action::Right).is_empty(), "{name}");
        }
    }

    #[test]
    fn wrap_stays_in_bounds() {
        let (state, agent) = state_with_agent_at(4, 0);
        assert_eq!(
            WrapMovement.candidates(&state, agent, Action::Right),
            vec![Position::new(0, 0)]
        );
        assert_eq!(
            WrapMovement.candidates(&state, agent, Action::Up),
            vec![Position::new(4, 4)]
        );
        assert_eq!(
            WrapMovement.heading(Action::Right, Position::new(4, 0), Position::new(0, 0)),
            Direction::RIGHT
        );
    }

    #[test]
    fn mirror_inverts() {
        let (state, agent) = state_with_agent_at(2, 2);
        assert_eq!(
            MirrorMovement.candidates(&state, agent, Action::Left),
            vec![Position::new(3, 2)]
        );
    }

    #[test]
    fn slippery_slides_to_the_wall() {
        let (mut state, agent) = state_with_agent_at(0, 0);
        state.world_mut().spawn_bundle(
            ComponentBundle::new()
                .with(Position::new(3, 0))
                .with(Blocking)
                .with(Collidable),
        );
        assert_eq!(
            SlipperyMovement.candidates(&state, agent, Action::Right),
            vec![Position::new(2, 0), Position::new(1, 0)]
        );
    }

    #[test]
    fn slippery_against_obstacle_offers_adjacent_cell() {
        let (mut state, agent) = state_with_agent_at(0, 0);
        state.world_mut().spawn_bundle(
            ComponentBundle::new()
                .with(Position::new(1, 0))
                .with(Pushable)
                .with(Collidable),
        );
        assert_eq!(
            SlipperyMovement.candidates(&state, agent, Action::Right),
            vec![Position::new(1, 0)]
        );
    }

    #[test]
    fn windy_is_deterministic_per_state() {
        let (state, agent) = state_with_agent_at(2, 2);
        let windy = WindyMovement { gust_chance: 0.5 };
        let first = windy.candidates(&state, agent, Action::Right);
        for _ in 0..10 {
            assert_eq!(windy.candidates(&state, agent, Action::Right), first);
        }
        assert_eq!(first.last(), Some(&Position::new(3, 2)));
    }

    #[test]
    fn windy_without_gusts_is_default() {
        let (state, agent) = state_with_agent_at(2, 2);
        let calm = WindyMovement { gust_chance: 0.0 };
        assert_eq!(
            calm.candidates(&state, agent, Action::Down),
            DefaultMovement.candidates(&state, agent, Action::Down)
        );
    }

    #[test]
    fn windy_always_gusting_offers_two_candidates_or_one() {
        let (state, agent) = state_with_agent_at(2, 2);
        let stormy = WindyMovement { gust_chance: 1.0 };
        let candidates = stormy.candidates(&state, agent, Action::Down);
        assert!(!candidates.is_empty() && candidates.len() <= 2);
        assert_eq!(candidates.last(), Some(&Position::new(2, 3)));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(movement_by_name("teleport").is_none());
    }
}
