//! The immutable world state consumed and produced by [`step`](crate::step::step).
//!
//! A [`State`] bundles grid dimensions, the ECS [`World`], and the two
//! pluggable strategies: the movement-delta function and the objective
//! predicate. Strategies are chosen once when the state is built and travel
//! with every state derived from it.

use std::fmt;
use std::sync::Arc;

use gridworld_ecs::prelude::*;

use crate::config::GridConfig;
use crate::movement::{DefaultMovement, MovementFn};
use crate::objective::{DefaultObjective, ObjectiveFn, Outcome};
use crate::EngineError;

/// An immutable snapshot of a grid world.
///
/// Cloning is cheap: every component table is shared until written. The
/// engine never mutates a `State` it was handed; it clones, writes the clone,
/// and returns it.
///
/// Fields are private so that every `State` has passed [`State::new`]:
/// both dimensions are positive and the world is consistent.
#[derive(Clone)]
pub struct State {
    width: i32,
    height: i32,
    seed: u64,
    world: World,
    movement: Arc<dyn MovementFn>,
    objective: Arc<dyn ObjectiveFn>,
}

impl State {
    /// Build a state with the default four-neighbour movement and the default
    /// objective.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDimensions`] for a bad config and
    /// [`EngineError::Ecs`] if `world` breaks the registry invariant.
    pub fn new(config: GridConfig, world: World) -> Result<Self, EngineError> {
        config.validate()?;
        world.validate()?;
        Ok(Self {
            width: config.width,
            height: config.height,
            seed: config.seed,
            world,
            movement: Arc::new(DefaultMovement),
            objective: Arc::new(DefaultObjective),
        })
    }

    /// Replace the world, keeping dimensions, seed and strategies.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ecs`] if `world` breaks the registry invariant.
    pub fn with_world(mut self, world: World) -> Result<Self, EngineError> {
        world.validate()?;
        self.world = world;
        Ok(self)
    }

    /// Replace the movement-delta strategy.
    pub fn with_movement(mut self, movement: Arc<dyn MovementFn>) -> Self {
        self.movement = movement;
        self
    }

    /// Replace the objective predicate.
    pub fn with_objective(mut self, objective: Arc<dyn ObjectiveFn>) -> Self {
        self.objective = objective;
        self
    }

    /// Number of columns; valid `x` is `0..width`. Always positive.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows; valid `y` is `0..height`. Always positive.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Seed for strategies that need randomness.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Entity registry and component tables.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Write access for the engine's own transitions, which only ever touch
    /// a fresh clone.
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn movement(&self) -> &dyn MovementFn {
        self.movement.as_ref()
    }

    pub fn objective(&self) -> &dyn ObjectiveFn {
        self.objective.as_ref()
    }

    pub fn config(&self) -> GridConfig {
        GridConfig {
            width: self.width,
            height: self.height,
            seed: self.seed,
        }
    }

    /// Whether `pos` lies inside `[0, width) x [0, height)`.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.world.get::<Position>(id).copied()
    }

    /// Evaluate the objective against this state.
    ///
    /// The step engine never calls this; drivers do, after each step.
    pub fn outcome(&self) -> Outcome {
        self.objective.evaluate(self)
    }
}

impl PartialEq for State {
    /// Equal when dimensions, seed, world contents and strategy names match.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.seed == other.seed
            && self.movement.name() == other.movement.name()
            && self.objective.name() == other.objective.name()
            && self.world == other.world
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("seed", &self.seed)
            .field("movement", &self.movement.name())
            .field("objective", &self.objective.name())
            .field("entity_count", &self.world.entity_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::WrapMovement;

    #[test]
    fn bounds_are_half_open() {
        let state = State::new(GridConfig::new(3, 2), World::new()).unwrap();
        assert!(state.in_bounds(Position::new(0, 0)));
        assert!(state.in_bounds(Position::new(2, 1)));
        assert!(!state.in_bounds(Position::new(3, 1)));
        assert!(!state.in_bounds(Position::new(2, 2)));
        assert!(!state.in_bounds(Position::new(-1, 0)));
    }

    #[test]
    fn rejects_dangling_components() {
        let mut world = World::new();
        world
            .table_mut::<Position>()
            .insert(EntityId::new(3), Position::new(0, 0));
        assert!(matches!(
            State::new(GridConfig::default(), world),
            Err(EngineError::Ecs(_))
        ));
    }

    #[test]
    fn zero_sized_grids_cannot_be_built() {
        for (w, h) in [(0, 3), (3, 0), (-2, 2)] {
            assert!(matches!(
                State::new(GridConfig::new(w, h), World::new()),
                Err(EngineError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn with_world_keeps_settings_and_validates() {
        let state = State::new(GridConfig::new(4, 2).with_seed(5), World::new())
            .unwrap()
            .with_movement(Arc::new(WrapMovement));

        let mut world = World::new();
        world.spawn_bundle(ComponentBundle::new().with(Position::new(3, 1)));
        let swapped = state.clone().with_world(world).unwrap();
        assert_eq!(swapped.config(), state.config());
        assert_eq!(swapped.movement().name(), "wrap");
        assert_eq!(swapped.world().entity_count(), 1);

        let mut dangling = World::new();
        dangling
            .table_mut::<Position>()
            .insert(EntityId::new(9), Position::new(0, 0));
        assert!(matches!(state.with_world(dangling), Err(EngineError::Ecs(_))));
    }

    #[test]
    fn equality_includes_strategy() {
        let a = State::new(GridConfig::default(), World::new()).unwrap();
        let b = a.clone().with_movement(Arc::new(WrapMovement));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn debug_names_strategies() {
        let state = State::new(GridConfig::default(), World::new()).unwrap();
        let text = format!("{state:?}");
        assert!(text.contains("movement: \"default\""));
        assert!(text.contains("objective: \"default\""));
    }
}
