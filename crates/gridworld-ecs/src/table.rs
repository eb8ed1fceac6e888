//! Persistent component tables.
//!
//! A [`Table`] is a sparse `EntityId -> T` mapping with value semantics.
//! Cloning a table is O(1) and shares storage with the original; the first
//! mutation through a shared handle copies the underlying map
//! (`Arc::make_mut`). A clone of a [`World`](crate::world::World) therefore
//! only pays for the tables that are actually written afterwards, and the
//! original is never affected.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entity::EntityId;

/// Copy-on-write mapping from entity to component value.
///
/// Iteration is always in ascending [`EntityId`] order.
#[derive(Debug)]
pub struct Table<T> {
    rows: Arc<BTreeMap<EntityId, T>>,
}

impl<T> Table<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(id, value)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.rows.iter().map(|(id, value)| (*id, value))
    }

    /// Iterate ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.rows.keys().copied()
    }

    /// Whether `self` and `other` still point at the same storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }
}

impl<T: Clone> Table<T> {
    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        Arc::make_mut(&mut self.rows).insert(id, value)
    }

    /// Remove and return the value for `id`.
    ///
    /// Removing a missing key does not copy shared storage.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        if !self.rows.contains_key(&id) {
            return None;
        }
        Arc::make_mut(&mut self.rows).remove(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.rows.contains_key(&id) {
            return None;
        }
        Arc::make_mut(&mut self.rows).get_mut(&id)
    }
}

// Manual impls: derives would demand `T: Clone` / `T: Default` for the Arc.
impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Table<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage_with(other) || self.rows == other.rows
    }
}

impl<T: Eq> Eq for Table<T> {}

impl<T: Clone> FromIterator<(EntityId, T)> for Table<T> {
    fn from_iter<I: IntoIterator<Item = (EntityId, T)>>(iter: I) -> Self {
        Self {
            rows: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<T> std::ops::Index<EntityId> for Table<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `id` has no row. Use [`Table::get`] when absence is expected.
    fn index(&self, id: EntityId) -> &T {
        &self.rows[&id]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
