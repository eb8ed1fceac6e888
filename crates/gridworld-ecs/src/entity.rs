//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is an opaque 64-bit handle. Ids are never reused within a
//! single [`World`](crate::world::World): the allocator only moves forward,
//! so an id that once named a despawned entity never names a different one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EcsError;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// An opaque entity identifier.
///
/// Ids are totally ordered. Every query that returns several entities (for
/// example "everything standing on this cell") returns them in ascending id
/// order, which is what makes the step engine independent of storage order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Construct an `EntityId` from its raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw `u64` representation.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Hands out fresh [`EntityId`]s.
///
/// Allocation is monotonic starting at 1. Callers that pick ids themselves
/// (level files, tests) call [`reserve`](Self::reserve) so that later
/// automatic allocations skip past them.
///
/// The raw value `u64::MAX` is never handed out or accepted; a counter that
/// reaches it is exhausted and every later allocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create a new allocator whose first id is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume allocation from a previously captured counter.
    pub const fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Allocate a fresh [`EntityId`], or `None` once the id space is used up.
    pub fn allocate(&mut self) -> Option<EntityId> {
        if self.is_exhausted() {
            return None;
        }
        let id = EntityId(self.next);
        self.next += 1;
        Some(id)
    }

    /// Make sure `id` will never be returned by [`allocate`](Self::allocate).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::IdSpaceExhausted`] for `u64::MAX`, which no
    /// allocator can step past.
    pub fn reserve(&mut self, id: EntityId) -> Result<(), EcsError> {
        let after = id
            .0
            .checked_add(1)
            .ok_or(EcsError::IdSpaceExhausted { requested: id })?;
        if after > self.next {
            self.next = after;
        }
        Ok(())
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub const fn peek(&self) -> u64 {
        self.next
    }

    pub const fn is_exhausted(&self) -> bool {
        self.next == u64::MAX
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let mut ids: Vec<EntityId> = (0..100).map(|_| alloc.allocate().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
        assert_eq!(ids[0], EntityId::new(1));
    }

    #[test]
    fn reserve_skips_explicit_ids() {
        let mut alloc = EntityAllocator::new();
        alloc.reserve(EntityId::new(42)).unwrap();
        assert_eq!(alloc.allocate(), Some(EntityId::new(43)));
    }

    #[test]
    fn reserve_below_counter_is_noop() {
        let mut alloc = EntityAllocator::new();
        let _ = alloc.allocate();
        let _ = alloc.allocate();
        alloc.reserve(EntityId::new(1)).unwrap();
        assert_eq!(alloc.peek(), 3);
    }

    #[test]
    fn reserving_the_last_raw_value_is_rejected() {
        let mut alloc = EntityAllocator::new();
        assert!(matches!(
            alloc.reserve(EntityId::new(u64::MAX)),
            Err(EcsError::IdSpaceExhausted { .. })
        ));
        assert_eq!(alloc.peek(), 1);
    }

    #[test]
    fn allocation_stops_at_the_end_of_the_id_space() {
        let mut alloc = EntityAllocator::new();
        alloc.reserve(EntityId::new(u64::MAX - 2)).unwrap();
        assert_eq!(alloc.allocate(), Some(EntityId::new(u64::MAX - 1)));
        assert!(alloc.is_exhausted());
        assert_eq!(alloc.allocate(), None);
        assert_eq!(alloc.allocate(), None);
        assert_eq!(alloc.peek(), u64::MAX);
    }

    #[test]
    fn entity_id_formatting() {
        let id = EntityId::new(7);
        assert_eq!(format!("{id:?}"), "EntityId(7)");
        assert_eq!(format!("{id}"), "7");
        assert_eq!(EntityId::from(id.to_raw()), id);
    }

    #[test]
    fn entity_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&EntityId::new(99)).unwrap();
        assert_eq!(json, "99");
    }
}
