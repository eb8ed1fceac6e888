//! Gridworld ECS -- sparse component tables for grid puzzle worlds.
//!
//! An entity is nothing but an [`EntityId`](entity::EntityId). Each component
//! kind (position, agent, pushable, blocking, ...) lives in its own persistent
//! [`Table`](table::Table), and an entity has a component exactly when its id
//! is a key in that table. A [`World`](world::World) bundles the entity
//! registry with every table and has value semantics: clones share storage,
//! and writes through one clone never affect another.
//!
//! # Quick Start
//!
//! ```
//! use gridworld_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let player = world.spawn_bundle(
//!     ComponentBundle::new()
//!         .with(Position::new(0, 0))
//!         .with(Agent)
//!         .with(Collidable),
//! );
//!
//! let before = world.clone();
//! world.table_mut::<Position>().insert(player, Position::new(1, 0));
//!
//! assert_eq!(before.get::<Position>(player), Some(&Position::new(0, 0)));
//! assert_eq!(world.get::<Position>(player), Some(&Position::new(1, 0)));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod snapshot;
pub mod table;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity is not in the registry.
    #[error("entity {entity} does not exist")]
    UnknownEntity { entity: entity::EntityId },

    /// An entity with this id is already alive.
    #[error("entity {entity} already exists")]
    DuplicateEntity { entity: entity::EntityId },

    /// A table holds a row for an entity that is not in the registry.
    #[error("component '{component}' references entity {entity}, which does not exist")]
    DanglingComponent {
        component: component::ComponentKind,
        entity: entity::EntityId,
    },

    /// An inventory lists an entity that is not in the registry.
    #[error("inventory of entity {holder} holds entity {item}, which does not exist")]
    DanglingInventoryItem {
        holder: entity::EntityId,
        item: entity::EntityId,
    },

    /// A component name that this crate does not know.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponent { name: String, registered: String },

    /// No id is left to hand out, or the requested id cannot be reserved.
    #[error("entity id space exhausted (requested {requested})")]
    IdSpaceExhausted { requested: entity::EntityId },

    /// Deserialization of a component value failed.
    #[error("failed to deserialize component '{component}': {details}")]
    ComponentDeserializationError { component: String, details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{
        Agent, Appearance, AppearanceName, Blocking, Collectible, Collidable, Component,
        ComponentKind, Direction, Exit, Inventory, Position, Pushable,
    };
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::snapshot::{EntitySnapshot, WorldSnapshot};
    pub use crate::table::Table;
    pub use crate::world::{ComponentBundle, World};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
