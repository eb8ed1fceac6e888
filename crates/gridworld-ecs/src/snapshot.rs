//! World snapshot and restore support.
//!
//! Provides [`WorldSnapshot`] -- a fully serializable representation of a
//! [`World`] that can be captured, written as JSON, and turned back into an
//! identical world (same entity ids, same allocator counter, same component
//! data).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::entity::{EntityAllocator, EntityId};
use crate::world::World;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Serializable snapshot of a single entity's component data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_id: EntityId,
    /// Map from component name to serialized JSON value.
    /// Uses `BTreeMap` for deterministic serialization order.
    pub components: BTreeMap<String, serde_json::Value>,
}

/// A complete, serializable snapshot of a [`World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Allocator counter, so ids handed out after restore match the original.
    pub next_id: u64,
    /// Every alive entity, sorted by id, including entities with no components.
    pub entities: Vec<EntitySnapshot>,
}

// ---------------------------------------------------------------------------
// World snapshot/restore impl
// ---------------------------------------------------------------------------

impl World {
    /// Capture a complete snapshot of the world.
    ///
    /// Output is deterministic: entities are ordered by id and components by
    /// name, so two equal worlds always produce byte-identical JSON.
    pub fn capture_snapshot(&self) -> WorldSnapshot {
        let entities = self
            .entities()
            .map(|entity_id| {
                let mut components = BTreeMap::new();
                for kind in ComponentKind::ALL {
                    match self.component_json(kind, entity_id) {
                        Some(Ok(value)) => {
                            components.insert(kind.name().to_owned(), value);
                        }
                        Some(Err(e)) => {
                            tracing::warn!(
                                entity = %entity_id,
                                component = %kind,
                                error = %e,
                                "component failed to serialize -- skipping in snapshot"
                            );
                        }
                        None => {}
                    }
                }
                EntitySnapshot {
                    entity_id,
                    components,
                }
            })
            .collect();

        WorldSnapshot {
            next_id: self.next_id(),
            entities,
        }
    }

    /// Build a world from a previously captured snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownComponent`] if the snapshot names a
    /// component this crate does not know, [`EcsError::DuplicateEntity`] if an
    /// id appears twice, and [`EcsError::ComponentDeserializationError`] if a
    /// value does not match its component's schema.
    pub fn restore_from_snapshot(snapshot: &WorldSnapshot) -> Result<World, EcsError> {
        // Reject unknown names before building anything.
        for entity in &snapshot.entities {
            for name in entity.components.keys() {
                if ComponentKind::from_name(name).is_none() {
                    return Err(EcsError::UnknownComponent {
                        name: name.clone(),
                        registered: ComponentKind::registered_names(),
                    });
                }
            }
        }

        let mut world = World::with_allocator(EntityAllocator::starting_at(snapshot.next_id));
        for entity in &snapshot.entities {
            world.spawn_with_id(entity.entity_id)?;
            for (name, value) in &entity.components {
                // Names were validated above.
                if let Some(kind) = ComponentKind::from_name(name) {
                    world.insert_json(kind, entity.entity_id, value)?;
                }
            }
        }
        Ok(world)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
