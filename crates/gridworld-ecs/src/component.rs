//! Component types and their table bindings.
//!
//! Components are plain data. Each kind lives in its own sparse
//! [`Table`](crate::table::Table) inside the [`World`]; an entity "has" a
//! component exactly when its id is a key in that table. There is no entity
//! object and no inheritance: presence or absence of a key is the whole model.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::table::Table;
use crate::world::World;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A displacement on the grid. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };
    pub const NONE: Direction = Direction { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Unit step from `from` towards `to`, taken component-wise.
    ///
    /// A straight multi-cell move (`(0,0) -> (3,0)`) yields `RIGHT`; a move
    /// onto the same cell yields [`NONE`](Self::NONE).
    pub fn unit_towards(from: Position, to: Position) -> Self {
        Self {
            dx: (to.x - from.x).signum(),
            dy: (to.y - from.y).signum(),
        }
    }

    pub const fn is_none(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub const fn reversed(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

// ---------------------------------------------------------------------------
// Spatial components
// ---------------------------------------------------------------------------

/// Integer grid cell. Several entities may share one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `dir`. May lie outside the grid.
    pub const fn offset(self, dir: Direction) -> Self {
        Self {
            x: self.x + dir.dx,
            y: self.y + dir.dy,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Marker components
// ---------------------------------------------------------------------------

/// Player-controlled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Agent;

/// Can be displaced by an adjacent push (only when also [`Collidable`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pushable;

/// Impassable and unpushable, e.g. a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Blocking;

/// Takes part in occupancy checks at its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collidable;

/// Cell feature that can be picked up. Never obstructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collectible;

/// Cell feature marking a level exit. Never obstructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exit;

// ---------------------------------------------------------------------------
// Data components
// ---------------------------------------------------------------------------

/// Cosmetic tag for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceName {
    Human,
    Box,
    Wall,
    Coin,
    Exit,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub name: AppearanceName,
}

impl Appearance {
    pub const fn new(name: AppearanceName) -> Self {
        Self { name }
    }
}

/// Entities held by another entity. Held entities have no `Position`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub items: BTreeSet<EntityId>,
}

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// The closed set of component tables a [`World`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Position,
    Agent,
    Pushable,
    Blocking,
    Collidable,
    Collectible,
    Exit,
    Appearance,
    Inventory,
}

impl ComponentKind {
    /// Every kind, in table declaration order.
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Position,
        ComponentKind::Agent,
        ComponentKind::Pushable,
        ComponentKind::Blocking,
        ComponentKind::Collidable,
        ComponentKind::Collectible,
        ComponentKind::Exit,
        ComponentKind::Appearance,
        ComponentKind::Inventory,
    ];

    /// Stable name used as the key in snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            ComponentKind::Position => "position",
            ComponentKind::Agent => "agent",
            ComponentKind::Pushable => "pushable",
            ComponentKind::Blocking => "blocking",
            ComponentKind::Collidable => "collidable",
            ComponentKind::Collectible => "collectible",
            ComponentKind::Exit => "exit",
            ComponentKind::Appearance => "appearance",
            ComponentKind::Inventory => "inventory",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Comma-separated list of every known name, for error messages.
    pub fn registered_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component trait
// ---------------------------------------------------------------------------

/// Binds a component type to its kind and to its table inside a [`World`].
///
/// This is what lets [`World::get`], [`World::insert`] and friends be generic
/// over the component type.
pub trait Component: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: ComponentKind;

    fn table(world: &World) -> &Table<Self>;

    fn table_mut(world: &mut World) -> &mut Table<Self>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_one_cell() {
        let p = Position::new(2, 2);
        assert_eq!(p.offset(Direction::RIGHT), Position::new(3, 2));
        assert_eq!(p.offset(Direction::LEFT), Position::new(1, 2));
        assert_eq!(p.offset(Direction::UP), Position::new(2, 1));
        assert_eq!(p.offset(Direction::DOWN), Position::new(2, 3));
    }

    #[test]
    fn unit_towards_normalizes_long_moves() {
        let from = Position::new(0, 0);
        assert_eq!(
            Direction::unit_towards(from, Position::new(4, 0)),
            Direction::RIGHT
        );
        assert_eq!(
            Direction::unit_towards(from, Position::new(0, -3)),
            Direction::UP
        );
        assert!(Direction::unit_towards(from, from).is_none());
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ComponentKind::from_name("velocity"), None);
    }

    #[test]
    fn appearance_serializes_snake_case() {
        let json = serde_json::to_value(Appearance::new(AppearanceName::Wall)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "wall"}));
    }
}
