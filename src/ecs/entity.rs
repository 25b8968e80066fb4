//! Entity identifiers and allocation

use std::fmt;

/// Opaque entity identifier.
///
/// Ids are handed out by a [`Registry`](super::Registry) starting at 0 and
/// are never reused. An entity carries no data of its own; it only keys the
/// per-type component pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Build an entity from a raw id, e.g. one read back from a log or a test.
    /// The id is only meaningful to the registry that issued it.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Monotonic entity allocator
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        entity
    }

    /// True for every id in `[0, next_id)`.
    pub fn is_allocated(&self, entity: Entity) -> bool {
        entity.0 < self.next_id
    }

    pub fn count(&self) -> usize {
        self.next_id as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_allocation() {
        let mut allocator = EntityAllocator::new();

        let e1 = allocator.allocate();
        assert_eq!(e1.raw(), 0);
        assert!(allocator.is_allocated(e1));

        let e2 = allocator.allocate();
        assert_eq!(e2.raw(), 1);
        assert!(allocator.is_allocated(e2));

        assert_eq!(allocator.count(), 2);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut allocator = EntityAllocator::new();
        let ids: Vec<u64> = (0..64).map(|_| allocator.allocate().raw()).collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ids.first().copied(), Some(0));
        assert_eq!(ids.last().copied(), Some(63));
    }

    #[test]
    fn test_unallocated_ids() {
        let mut allocator = EntityAllocator::new();
        assert!(!allocator.is_allocated(Entity::from_raw(0)));

        allocator.allocate();
        assert!(allocator.is_allocated(Entity::from_raw(0)));
        assert!(!allocator.is_allocated(Entity::from_raw(1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::from_raw(7).to_string(), "entity#7");
    }
}
