//! Component pools: one contiguous array per component type

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::mem;

use super::Entity;

/// Marker trait for component records
pub trait Component: 'static {}

/// Type-erased view of a component pool.
///
/// The registry keeps pools behind this trait so that type-independent
/// questions (who owns a component of this type, how many are there) can be
/// answered without knowing `T`.
pub trait ComponentStorage: Any {
    fn type_name(&self) -> &'static str;
    /// Owners in slot order, one per stored component.
    fn owners(&self) -> &[Entity];
    fn has(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete storage for a specific component type.
///
/// `data` and `owners` grow in lock-step; `index` maps an owner back to its
/// slot.
pub struct ComponentPool<T: Component> {
    data: Vec<T>,
    owners: Vec<Entity>,
    index: HashMap<Entity, usize>,
}

impl<T: Component> ComponentPool<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            owners: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Attach `component` to `entity`.
    ///
    /// An entity that already owns a `T` has its slot overwritten in place and
    /// the previous value is returned; owners and index stay untouched.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        if let Some(&slot) = self.index.get(&entity) {
            return Some(mem::replace(&mut self.data[slot], component));
        }
        let slot = self.data.len();
        self.data.push(component);
        self.owners.push(entity);
        self.index.insert(entity, slot);
        None
    }

    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.index.get(&entity).copied()
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slot_of(entity).map(|slot| &self.data[slot])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.slot_of(entity)?;
        Some(&mut self.data[slot])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.owners.iter().copied().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.owners.iter().copied().zip(self.data.iter_mut())
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for ComponentPool<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn owners(&self) -> &[Entity] {
        &self.owners
    }

    fn has(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    fn e(id: u64) -> Entity {
        Entity::from_raw(id)
    }

    #[test]
    fn test_component_pool() {
        let mut pool = ComponentPool::<Position>::new();

        assert!(pool.insert(e(1), Position { x: 1.0, y: 2.0 }).is_none());
        assert!(pool.insert(e(2), Position { x: 3.0, y: 4.0 }).is_none());

        assert_eq!(pool.len(), 2);
        assert!(pool.has(e(1)));
        assert!(pool.has(e(2)));
        assert!(!pool.has(e(3)));

        let pos = pool.get(e(1)).unwrap();
        assert_eq!(pos.x, 1.0);
        assert_eq!(pos.y, 2.0);
        assert_eq!(pool.owners(), &[e(1), e(2)]);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut pool = ComponentPool::<Position>::new();
        pool.insert(e(4), Position { x: 1.0, y: 1.0 });
        pool.insert(e(9), Position { x: 2.0, y: 2.0 });

        let previous = pool.insert(e(4), Position { x: 5.0, y: 5.0 });

        assert_eq!(previous, Some(Position { x: 1.0, y: 1.0 }));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.slot_of(e(4)), Some(0));
        assert_eq!(pool.owners(), &[e(4), e(9)]);
        assert_eq!(pool.get(e(4)), Some(&Position { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn test_component_iteration() {
        let mut pool = ComponentPool::<Position>::new();

        pool.insert(e(1), Position { x: 1.0, y: 2.0 });
        pool.insert(e(2), Position { x: 3.0, y: 4.0 });

        let order: Vec<Entity> = pool.iter().map(|(entity, _)| entity).collect();
        assert_eq!(order, vec![e(1), e(2)]);

        for (_entity, pos) in pool.iter_mut() {
            pos.x += 1.0;
        }

        assert_eq!(pool.get(e(1)).unwrap().x, 2.0);
        assert_eq!(pool.as_slice()[1].x, 4.0);
    }

    #[test]
    fn test_type_erased_downcast() {
        let mut boxed: Box<dyn ComponentStorage> = Box::new(ComponentPool::<Position>::new());
        assert!(boxed.is_empty());
        assert!(boxed.type_name().ends_with("Position"));

        let pool = boxed
            .as_any_mut()
            .downcast_mut::<ComponentPool<Position>>()
            .unwrap();
        pool.insert(e(0), Position { x: 0.0, y: 0.0 });

        assert_eq!(boxed.len(), 1);
        assert_eq!(boxed.owners(), &[e(0)]);
    }
}
