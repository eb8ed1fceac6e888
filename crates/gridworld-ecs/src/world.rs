//! The [`World`] is the top-level container for the ECS. It owns the entity
//! registry, the id allocator, and one persistent table per component kind.
//!
//! `World` has value semantics. Cloning is cheap (every table is shared) and
//! writes through a clone never show up in the original, so a caller holding
//! a `World` can treat it as an immutable snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::component::{
    Agent, Appearance, Blocking, Collectible, Collidable, Component, ComponentKind, Exit,
    Inventory, Position, Pushable,
};
use crate::entity::{EntityAllocator, EntityId};
use crate::table::Table;
use crate::EcsError;

// ---------------------------------------------------------------------------
// ComponentBundle
// ---------------------------------------------------------------------------

type ApplyFn = Box<dyn FnOnce(&mut World, EntityId) + Send>;

/// A set of components to attach to an entity at spawn time.
///
/// ```
/// use gridworld_ecs::prelude::*;
///
/// let mut world = World::new();
/// let bundle = ComponentBundle::new()
///     .with(Position::new(1, 0))
///     .with(Pushable)
///     .with(Collidable);
/// let crate_id = world.spawn_bundle(bundle);
/// assert!(world.has::<Pushable>(crate_id));
/// ```
///
/// Adding the same component type twice keeps the last value.
#[derive(Default)]
pub struct ComponentBundle {
    entries: Vec<(ComponentKind, ApplyFn)>,
}

impl ComponentBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a component to the bundle.
    pub fn add<T: Component>(&mut self, value: T) {
        self.entries.retain(|(kind, _)| *kind != T::KIND);
        self.entries.push((
            T::KIND,
            Box::new(move |world: &mut World, id: EntityId| {
                T::table_mut(world).insert(id, value);
            }),
        ));
    }

    /// Builder-style [`add`](Self::add).
    pub fn with<T: Component>(mut self, value: T) -> Self {
        self.add(value);
        self
    }

    /// Component kinds in this bundle, sorted.
    pub fn kinds(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<_> = self.entries.iter().map(|(kind, _)| *kind).collect();
        kinds.sort();
        kinds
    }

    fn apply(self, world: &mut World, id: EntityId) {
        for (_, apply) in self.entries {
            apply(world, id);
        }
    }
}

impl std::fmt::Debug for ComponentBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBundle")
            .field("kinds", &self.kinds())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Entity registry plus one sparse table per component kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    allocator: EntityAllocator,
    entities: Arc<BTreeSet<EntityId>>,
    position: Table<Position>,
    agent: Table<Agent>,
    pushable: Table<Pushable>,
    blocking: Table<Blocking>,
    collidable: Table<Collidable>,
    collectible: Table<Collectible>,
    exit: Table<Exit>,
    appearance: Table<Appearance>,
    inventory: Table<Inventory>,
}

macro_rules! impl_component {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn table(world: &World) -> &Table<Self> {
                &world.$field
            }

            fn table_mut(world: &mut World) -> &mut Table<Self> {
                &mut world.$field
            }
        }
    };
}

impl_component!(Position, Position, position);
impl_component!(Agent, Agent, agent);
impl_component!(Pushable, Pushable, pushable);
impl_component!(Blocking, Blocking, blocking);
impl_component!(Collidable, Collidable, collidable);
impl_component!(Collectible, Collectible, collectible);
impl_component!(Exit, Exit, exit);
impl_component!(Appearance, Appearance, appearance);
impl_component!(Inventory, Inventory, inventory);

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_allocator(allocator: EntityAllocator) -> Self {
        Self {
            allocator,
            ..Self::default()
        }
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Spawn an entity with no components.
    ///
    /// # Panics
    ///
    /// Panics if the id space is exhausted. That only happens after an id
    /// just below `u64::MAX` was reserved; use [`try_spawn`](Self::try_spawn)
    /// when ids come from untrusted input.
    pub fn spawn(&mut self) -> EntityId {
        match self.try_spawn() {
            Ok(id) => id,
            Err(e) => panic!("World::spawn: {e}"),
        }
    }

    /// Spawn an entity with no components, failing instead of panicking
    /// when no id is left.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::IdSpaceExhausted`] if the allocator has no id left.
    pub fn try_spawn(&mut self) -> Result<EntityId, EcsError> {
        let id = self
            .allocator
            .allocate()
            .ok_or(EcsError::IdSpaceExhausted {
                requested: EntityId::new(self.allocator.peek()),
            })?;
        // Allocated ids are always above every reserved one.
        debug_assert!(!self.entities.contains(&id));
        Arc::make_mut(&mut self.entities).insert(id);
        Ok(id)
    }

    /// Spawn an entity under a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateEntity`] if `id` is already alive and
    /// [`EcsError::IdSpaceExhausted`] for `u64::MAX`. The world is left
    /// untouched on error.
    pub fn spawn_with_id(&mut self, id: EntityId) -> Result<EntityId, EcsError> {
        if self.entities.contains(&id) {
            return Err(EcsError::DuplicateEntity { entity: id });
        }
        self.allocator.reserve(id)?;
        Arc::make_mut(&mut self.entities).insert(id);
        Ok(id)
    }

    /// Spawn an entity and attach every component in `bundle`.
    pub fn spawn_bundle(&mut self, bundle: ComponentBundle) -> EntityId {
        let id = self.spawn();
        bundle.apply(self, id);
        id
    }

    /// [`spawn_with_id`](Self::spawn_with_id) followed by the bundle's components.
    ///
    /// # Errors
    ///
    /// Same as [`spawn_with_id`](Self::spawn_with_id); the world is left
    /// untouched on error.
    pub fn spawn_bundle_with_id(
        &mut self,
        id: EntityId,
        bundle: ComponentBundle,
    ) -> Result<EntityId, EcsError> {
        self.spawn_with_id(id)?;
        bundle.apply(self, id);
        Ok(id)
    }

    /// Remove an entity from the registry and from every table.
    ///
    /// Inventories still listing the entity are left alone; the caller that
    /// despawns a held item is responsible for its holder.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `id` is not alive.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), EcsError> {
        if !self.entities.contains(&id) {
            return Err(EcsError::UnknownEntity { entity: id });
        }
        Arc::make_mut(&mut self.entities).remove(&id);
        self.position.remove(id);
        self.agent.remove(id);
        self.pushable.remove(id);
        self.blocking.remove(id);
        self.collidable.remove(id);
        self.collectible.remove(id);
        self.exit.remove(id);
        self.appearance.remove(id);
        self.inventory.remove(id);
        Ok(())
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Alive entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// The id the next [`spawn`](Self::spawn) will hand out.
    pub fn next_id(&self) -> u64 {
        self.allocator.peek()
    }

    // -- typed component access ---------------------------------------------

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        T::table(self).get(id)
    }

    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        T::table(self).contains(id)
    }

    /// Attach or overwrite a component. Returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `id` is not alive.
    pub fn insert<T: Component>(&mut self, id: EntityId, value: T) -> Result<Option<T>, EcsError> {
        if !self.entities.contains(&id) {
            return Err(EcsError::UnknownEntity { entity: id });
        }
        Ok(T::table_mut(self).insert(id, value))
    }

    /// Detach a component. Absent components are not an error.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> Option<T> {
        T::table_mut(self).remove(id)
    }

    pub fn table<T: Component>(&self) -> &Table<T> {
        T::table(self)
    }

    /// Direct mutable access to a table.
    ///
    /// Bypasses the liveness check done by [`insert`](Self::insert); callers
    /// must only write rows for alive entities.
    pub fn table_mut<T: Component>(&mut self) -> &mut Table<T> {
        T::table_mut(self)
    }

    /// Component kinds attached to `id`, in declaration order.
    pub fn kinds_of(&self, id: EntityId) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|kind| self.has_kind(*kind, id))
            .collect()
    }

    pub fn has_kind(&self, kind: ComponentKind, id: EntityId) -> bool {
        match kind {
            ComponentKind::Position => self.position.contains(id),
            ComponentKind::Agent => self.agent.contains(id),
            ComponentKind::Pushable => self.pushable.contains(id),
            ComponentKind::Blocking => self.blocking.contains(id),
            ComponentKind::Collidable => self.collidable.contains(id),
            ComponentKind::Collectible => self.collectible.contains(id),
            ComponentKind::Exit => self.exit.contains(id),
            ComponentKind::Appearance => self.appearance.contains(id),
            ComponentKind::Inventory => self.inventory.contains(id),
        }
    }

    // -- spatial queries ------------------------------------------------------

    /// Every entity whose `Position` equals `cell`, in ascending id order.
    ///
    /// Entities without a `Position` are never returned.
    pub fn entities_at(&self, cell: Position) -> Vec<EntityId> {
        self.position
            .iter()
            .filter(|(_, pos)| **pos == cell)
            .map(|(id, _)| id)
            .collect()
    }

    // -- invariants -----------------------------------------------------------

    /// Check that every id referenced by any table is alive.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning tables in declaration
    /// order and ids in ascending order.
    pub fn validate(&self) -> Result<(), EcsError> {
        for kind in ComponentKind::ALL {
            if let Some(entity) = self.ids_of(kind).find(|id| !self.entities.contains(id)) {
                return Err(EcsError::DanglingComponent {
                    component: kind,
                    entity,
                });
            }
        }
        for (holder, inventory) in self.inventory.iter() {
            if let Some(item) = inventory.items.iter().find(|id| !self.entities.contains(*id)) {
                return Err(EcsError::DanglingInventoryItem {
                    holder,
                    item: *item,
                });
            }
        }
        Ok(())
    }

    fn ids_of(&self, kind: ComponentKind) -> Box<dyn Iterator<Item = EntityId> + '_> {
        match kind {
            ComponentKind::Position => Box::new(self.position.ids()),
            ComponentKind::Agent => Box::new(self.agent.ids()),
            ComponentKind::Pushable => Box::new(self.pushable.ids()),
            ComponentKind::Blocking => Box::new(self.blocking.ids()),
            ComponentKind::Collidable => Box::new(self.collidable.ids()),
            ComponentKind::Collectible => Box::new(self.collectible.ids()),
            ComponentKind::Exit => Box::new(self.exit.ids()),
            ComponentKind::Appearance => Box::new(self.appearance.ids()),
            ComponentKind::Inventory => Box::new(self.inventory.ids()),
        }
    }

    // -- dynamic (JSON) access, used by snapshots ---------------------------

    pub(crate) fn component_json(
        &self,
        kind: ComponentKind,
        id: EntityId,
    ) -> Option<serde_json::Result<serde_json::Value>> {
        fn encode<T: Component>(world: &World, id: EntityId) -> Option<serde_json::Result<serde_json::Value>> {
            T::table(world).get(id).map(serde_json::to_value)
        }
        match kind {
            ComponentKind::Position => encode::<Position>(self, id),
            ComponentKind::Agent => encode::<Agent>(self, id),
            ComponentKind::Pushable => encode::<Pushable>(self, id),
            ComponentKind::Blocking => encode::<Blocking>(self, id),
            ComponentKind::Collidable => encode::<Collidable>(self, id),
            ComponentKind::Collectible => encode::<Collectible>(self, id),
            ComponentKind::Exit => encode::<Exit>(self, id),
            ComponentKind::Appearance => encode::<Appearance>(self, id),
            ComponentKind::Inventory => encode::<Inventory>(self, id),
        }
    }

    pub(crate) fn insert_json(
        &mut self,
        kind: ComponentKind,
        id: EntityId,
        value: &serde_json::Value,
    ) -> Result<(), EcsError> {
        fn decode<T: Component>(
            world: &mut World,
            id: EntityId,
            value: &serde_json::Value,
        ) -> Result<(), EcsError> {
            let typed: T = serde_json::from_value(value.clone()).map_err(|e| {
                EcsError::ComponentDeserializationError {
                    component: T::KIND.name().to_owned(),
                    details: e.to_string(),
                }
            })?;
            world.insert(id, typed)?;
            Ok(())
        }
        match kind {
            ComponentKind::Position => decode::<Position>(self, id, value),
            ComponentKind::Agent => decode::<Agent>(self, id, value),
            ComponentKind::Pushable => decode::<Pushable>(self, id, value),
            ComponentKind::Blocking => decode::<Blocking>(self, id, value),
            ComponentKind::Collidable => decode::<Collidable>(self, id, value),
            ComponentKind::Collectible => decode::<Collectible>(self, id, value),
            ComponentKind::Exit => decode::<Exit>(self, id, value),
            ComponentKind::Appearance => decode::<Appearance>(self, id, value),
            ComponentKind::Inventory => decode::<Inventory>(self, id, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
