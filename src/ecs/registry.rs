//! Registry - owns every entity and every component pool

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::entity::EntityAllocator;
use super::{Component, ComponentPool, ComponentStorage, EcsError, Entity};

/// Entity and component store.
///
/// One [`ComponentPool`] exists per component type that has ever been
/// registered. Lookups for a type that has no pool fail with
/// [`EcsError::UnknownComponentType`]; lookups for a created entity that
/// simply lacks the component return `None`.
///
/// References handed out by [`get`](Self::get) borrow the registry, so the
/// borrow checker already prevents holding one across a
/// [`register`](Self::register) that could grow the pool.
#[derive(Default)]
pub struct Registry {
    entities: EntityAllocator,
    pools: HashMap<TypeId, Box<dyn ComponentStorage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            pools: HashMap::new(),
        }
    }

    /// Create a new entity
    pub fn create(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Check whether `entity` was issued by this registry
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.is_allocated(entity)
    }

    /// Number of entities created so far
    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Attach `component` to `entity`.
    ///
    /// If the entity already carries a `T` the stored value is replaced in
    /// place and returned; its slot and registration order are kept.
    pub fn register<T: Component>(
        &mut self,
        component: T,
        entity: Entity,
    ) -> Result<Option<T>, EcsError> {
        self.check_valid(entity)?;
        Ok(self.insert(entity, component))
    }

    /// Like [`register`](Self::register), but refuses to replace an existing
    /// component.
    pub fn register_unique<T: Component>(
        &mut self,
        component: T,
        entity: Entity,
    ) -> Result<(), EcsError> {
        self.check_valid(entity)?;
        if self.has::<T>(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: type_name::<T>(),
            });
        }
        self.insert(entity, component);
        Ok(())
    }

    /// Entities carrying a `T`, in registration order.
    ///
    /// The returned vector is a copy; later registrations do not show up in it.
    pub fn view<T: Component>(&self) -> Result<Vec<Entity>, EcsError> {
        let storage = self
            .pools
            .get(&TypeId::of::<T>())
            .ok_or_else(unknown_type::<T>)?;
        Ok(storage.owners().to_vec())
    }

    /// Get the `T` attached to `entity`, or `None` if it has none.
    pub fn get<T: Component>(&self, entity: Entity) -> Result<Option<&T>, EcsError> {
        self.check_exists(entity)?;
        Ok(self.pool::<T>()?.get(entity))
    }

    /// Mutable counterpart of [`get`](Self::get); edits land directly in the pool.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<Option<&mut T>, EcsError> {
        self.check_exists(entity)?;
        Ok(self.pool_mut::<T>()?.get_mut(entity))
    }

    /// Check if entity has a component
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.pools
            .get(&TypeId::of::<T>())
            .is_some_and(|storage| storage.has(entity))
    }

    /// Check whether a pool exists for `T`
    pub fn has_type<T: Component>(&self) -> bool {
        self.pools.contains_key(&TypeId::of::<T>())
    }

    /// Number of `T` components stored (0 when the type is unknown)
    pub fn len<T: Component>(&self) -> usize {
        self.pools
            .get(&TypeId::of::<T>())
            .map_or(0, |storage| storage.len())
    }

    /// `(owner, component)` pairs for `T` in registration order
    pub fn iter<T: Component>(&self) -> Result<impl Iterator<Item = (Entity, &T)>, EcsError> {
        Ok(self.pool::<T>()?.iter())
    }

    pub fn iter_mut<T: Component>(
        &mut self,
    ) -> Result<impl Iterator<Item = (Entity, &mut T)>, EcsError> {
        Ok(self.pool_mut::<T>()?.iter_mut())
    }

    /// Type names of every registered pool, sorted
    pub fn component_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.pools.values().map(|s| s.type_name()).collect();
        names.sort_unstable();
        names
    }

    /// Get storage for a component type
    pub fn pool<T: Component>(&self) -> Result<&ComponentPool<T>, EcsError> {
        self.pools
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<ComponentPool<T>>())
            .ok_or_else(unknown_type::<T>)
    }

    /// Get mutable storage for a component type
    pub fn pool_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>, EcsError> {
        self.pools
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<ComponentPool<T>>())
            .ok_or_else(unknown_type::<T>)
    }

    /// Store `component` in the `T` pool, creating the pool on first use.
    fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Option<T> {
        let storage = self
            .pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentPool::<T>::new()));
        if let Some(pool) = storage.as_any_mut().downcast_mut::<ComponentPool<T>>() {
            return pool.insert(entity, component);
        }
        None
    }

    fn check_valid(&self, entity: Entity) -> Result<(), EcsError> {
        if self.entities.is_allocated(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity {
                entity,
                next_id: self.entities.count() as u64,
            })
        }
    }

    fn check_exists(&self, entity: Entity) -> Result<(), EcsError> {
        if self.entities.is_allocated(entity) {
            Ok(())
        } else {
            Err(EcsError::UnknownEntity(entity))
        }
    }
}

fn unknown_type<T: Component>() -> EcsError {
    EcsError::UnknownComponentType(type_name::<T>())
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

    #[derive(Debug, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    #[test]
    fn test_registry_entity_lifecycle() {
        let mut registry = Registry::new();

        let e1 = registry.create();
        let e2 = registry.create();

        assert!(registry.contains(e1));
        assert!(registry.contains(e2));
        assert!(!registry.contains(Entity::from_raw(2)));
        assert_eq!(registry.entity_count(), 2);
    }

    #[test]
    fn test_registry_components() {
        let mut registry = Registry::new();

        let entity = registry.create();
        registry.register(Position { x: 1.0, y: 2.0 }, entity).unwrap();
        registry.register(Velocity { dx: 0.5, dy: 0.5 }, entity).unwrap();

        assert!(registry.has::<Position>(entity));
        assert!(registry.has::<Velocity>(entity));

        let pos = registry.get::<Position>(entity).unwrap().unwrap();
        assert_eq!(pos.x, 1.0);

        if let Some(vel) = registry.get_mut::<Velocity>(entity).unwrap() {
            vel.dx = 1.0;
        }

        let vel = registry.get::<Velocity>(entity).unwrap().unwrap();
        assert_eq!(vel.dx, 1.0);
    }

    #[test]
    fn test_first_register_creates_pool() {
        let mut registry = Registry::new();
        let entity = registry.create();
        assert!(!registry.has_type::<Velocity>());

        let previous = registry.register(Velocity { dx: 1.0, dy: 0.0 }, entity).unwrap();

        assert_eq!(previous, None);
        assert!(registry.has_type::<Velocity>());
        assert_eq!(registry.pool::<Velocity>().unwrap().slot_of(entity), Some(0));
        assert_eq!(registry.view::<Velocity>().unwrap(), vec![entity]);
    }

    #[test]
    fn test_register_replaces_existing_component() {
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();
        registry.register(Position { x: 1.0, y: 1.0 }, a).unwrap();
        registry.register(Position { x: 2.0, y: 2.0 }, b).unwrap();

        let previous = registry.register(Position { x: 9.0, y: 9.0 }, a).unwrap();

        assert_eq!(previous, Some(Position { x: 1.0, y: 1.0 }));
        assert_eq!(registry.len::<Position>(), 2);
        assert_eq!(registry.view::<Position>().unwrap(), vec![a, b]);
        assert_eq!(
            registry.get::<Position>(a).unwrap(),
            Some(&Position { x: 9.0, y: 9.0 })
        );
    }

    #[test]
    fn test_register_unique_rejects_duplicates() {
        let mut registry = Registry::new();
        let entity = registry.create();
        registry
            .register_unique(Position { x: 1.0, y: 1.0 }, entity)
            .unwrap();

        let err = registry
            .register_unique(Position { x: 2.0, y: 2.0 }, entity)
            .unwrap_err();

        assert!(matches!(err, EcsError::DuplicateComponent { entity: e, .. } if e == entity));
        assert_eq!(registry.len::<Position>(), 1);
        assert_eq!(registry.get::<Position>(entity).unwrap().unwrap().x, 1.0);
    }

    #[test]
    fn test_invalid_entity_creates_no_pool() {
        let mut registry = Registry::new();
        registry.create();

        let err = registry
            .register(Position { x: 0.0, y: 0.0 }, Entity::from_raw(1))
            .unwrap_err();

        assert_eq!(
            err,
            EcsError::InvalidEntity {
                entity: Entity::from_raw(1),
                next_id: 1
            }
        );
        assert!(!registry.has_type::<Position>());
        assert!(registry.component_types().is_empty());
    }

    #[test]
    fn test_unknown_type_is_an_error_for_view_and_get() {
        let mut registry = Registry::new();
        let entity = registry.create();

        assert!(matches!(
            registry.view::<Velocity>(),
            Err(EcsError::UnknownComponentType(_))
        ));
        assert!(matches!(
            registry.get::<Velocity>(entity),
            Err(EcsError::UnknownComponentType(_))
        ));
        assert!(registry.iter::<Velocity>().is_err());
    }

    #[test]
    fn test_unknown_entity_is_checked_before_type() {
        let registry = Registry::new();
        assert_eq!(
            registry.get::<Position>(Entity::from_raw(3)).unwrap_err(),
            EcsError::UnknownEntity(Entity::from_raw(3))
        );
    }

    #[test]
    fn test_iter_mut_updates_in_place() {
        let mut registry = Registry::new();
        for i in 0..3 {
            let entity = registry.create();
            registry
                .register(Velocity { dx: i as f32, dy: 0.0 }, entity)
                .unwrap();
        }

        for (_, vel) in registry.iter_mut::<Velocity>().unwrap() {
            vel.dy = vel.dx * 2.0;
        }

        let dys: Vec<f32> = registry
            .iter::<Velocity>()
            .unwrap()
            .map(|(_, vel)| vel.dy)
            .collect();
        assert_eq!(dys, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_component_types_lists_pools() {
        let mut registry = Registry::new();
        let entity = registry.create();
        registry.register(Velocity { dx: 0.0, dy: 0.0 }, entity).unwrap();
        registry.register(Position { x: 0.0, y: 0.0 }, entity).unwrap();

        let names = registry.component_types();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|name| name.ends_with("Position")));
        assert!(names.iter().any(|name| name.ends_with("Velocity")));
    }
}
