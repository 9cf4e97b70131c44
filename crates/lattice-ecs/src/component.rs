use std::any::{type_name, Any};
use std::collections::TryReserveError;

use tracing::trace;

use crate::config::EcsConfig;
use crate::entity::Entity;
use crate::error::EcsError;

/// Marker trait for types that can be stored as ECS components.
pub trait Component: 'static + Send + Sync {}

/// Blanket implementation: any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Type-erased component storage interface.
pub(crate) trait AnyStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn len(&self) -> usize;
}

/// Dense storage for a single component type, indexed through a sparse
/// entity → slot map.
///
/// Slots are append-only: once an entity has a slot it keeps it for the
/// lifetime of the storage, and storing again overwrites that slot in place.
/// The dense array grows by doubling, so references into it are only valid
/// until the next [`store`](Self::store).
pub struct ComponentStorage<T> {
    /// Packed component values.
    dense: Vec<T>,
    /// Owner of each dense slot.
    entities: Vec<Entity>,
    /// Maps entity id → dense slot. `None` means the entity has no component.
    sparse: Vec<Option<usize>>,
    /// Slots reserved on the first store.
    initial_capacity: usize,
}

impl<T: Component> ComponentStorage<T> {
    /// An empty storage that reserves `capacity` slots on its first store.
    ///
    /// Nothing is allocated here, so an oversized capacity surfaces as
    /// [`EcsError::StorageExhausted`] from [`store`](Self::store).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
            initial_capacity: capacity,
        }
    }

    /// Store `value` for `entity` and return its dense slot.
    pub fn store(&mut self, entity: Entity, value: T) -> Result<usize, EcsError> {
        if let Some(index) = self.index_of(entity) {
            self.dense[index] = value;
            return Ok(index);
        }

        self.grow_sparse(entity)?;
        self.grow_dense()?;

        let index = self.dense.len();
        self.dense.push(value);
        self.entities.push(entity);
        self.sparse[entity.slot()] = Some(index);
        Ok(index)
    }

    /// The component stored for `entity`.
    pub fn get(&self, entity: Entity) -> Result<&T, EcsError> {
        match self.index_of(entity) {
            Some(index) => Ok(&self.dense[index]),
            None => Err(Self::missing(entity)),
        }
    }

    /// The component stored for `entity`, mutably.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        match self.index_of(entity) {
            Some(index) => Ok(&mut self.dense[index]),
            None => Err(Self::missing(entity)),
        }
    }

    /// The dense slot holding `entity`'s component, if any.
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.sparse.get(entity.slot()).copied().flatten()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.index_of(entity).is_some()
    }

    /// All stored values in slot order.
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    /// The owning entity of each slot in [`as_slice`](Self::as_slice).
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate over all `(entity, &component)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Slots available before the dense array has to grow.
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }

    fn grow_dense(&mut self) -> Result<(), EcsError> {
        if self.dense.len() < self.dense.capacity() {
            return Ok(());
        }
        let additional = match self.dense.capacity() {
            0 => self.initial_capacity.max(1),
            capacity => capacity,
        };
        let requested = self.dense.len().saturating_add(additional);
        self.dense
            .try_reserve_exact(additional)
            .map_err(|source| Self::exhausted(requested, source))?;
        self.entities
            .try_reserve_exact(additional)
            .map_err(|source| Self::exhausted(requested, source))?;
        trace!(
            component = type_name::<T>(),
            capacity = self.dense.capacity(),
            "grew component storage"
        );
        Ok(())
    }

    fn grow_sparse(&mut self, entity: Entity) -> Result<(), EcsError> {
        let slot = entity.slot();
        if slot < self.sparse.len() {
            return Ok(());
        }
        let target = (self.sparse.len() * 2).max(slot + 1);
        self.sparse
            .try_reserve_exact(target - self.sparse.len())
            .map_err(|source| Self::exhausted(target, source))?;
        self.sparse.resize(target, None);
        Ok(())
    }

    fn missing(entity: Entity) -> EcsError {
        EcsError::MissingComponent {
            entity,
            component: type_name::<T>(),
        }
    }

    fn exhausted(requested: usize, source: TryReserveError) -> EcsError {
        EcsError::StorageExhausted {
            component: type_name::<T>(),
            requested,
            source,
        }
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::with_capacity(EcsConfig::DEFAULT_INITIAL_CAPACITY)
    }
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.dense.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    #[test]
    fn store_and_get() {
        let mut storage = ComponentStorage::default();
        storage.store(e(5), 42i32).unwrap();
        assert_eq!(*storage.get(e(5)).unwrap(), 42);
        assert!(storage.get(e(1)).is_err());
    }

    #[test]
    fn first_slot_is_zero() {
        let mut storage = ComponentStorage::default();
        assert_eq!(storage.store(e(3), 'a').unwrap(), 0);
        assert_eq!(storage.store(e(1), 'b').unwrap(), 1);
        assert_eq!(storage.index_of(e(3)), Some(0));
        assert_eq!(storage.index_of(e(2)), None);
    }

    #[test]
    fn store_twice_overwrites_in_place() {
        let mut storage = ComponentStorage::default();
        let first = storage.store(e(1), 1i32).unwrap();
        let second = storage.store(e(1), 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(*storage.get(e(1)).unwrap(), 2);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn missing_component_names_type() {
        let storage = ComponentStorage::<u64>::default();
        let err = storage.get(e(9)).unwrap_err();
        match err {
            EcsError::MissingComponent { entity, component } => {
                assert_eq!(entity, e(9));
                assert_eq!(component, "u64");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mutate_in_place() {
        let mut storage = ComponentStorage::default();
        storage.store(e(2), [0.0f32; 3]).unwrap();
        storage.get_mut(e(2)).unwrap()[1] = 4.0;
        assert_eq!(storage.get(e(2)).unwrap(), &[0.0, 4.0, 0.0]);
    }

    #[test]
    fn dense_capacity_doubles() {
        let mut storage = ComponentStorage::with_capacity(4);
        for id in 1..=4 {
            storage.store(e(id), id).unwrap();
        }
        assert!(storage.capacity() >= 4);
        storage.store(e(5), 5).unwrap();
        assert!(storage.capacity() >= 8);
    }

    #[test]
    fn nothing_reserved_before_first_store() {
        let mut storage = ComponentStorage::with_capacity(16);
        assert_eq!(storage.capacity(), 0);
        storage.store(e(1), 1u16).unwrap();
        assert!(storage.capacity() >= 16);
    }

    #[test]
    fn oversized_initial_capacity_is_an_error() {
        let mut storage = ComponentStorage::with_capacity(usize::MAX / 4);
        let err = storage.store(e(1), 1.0f32).unwrap_err();
        match err {
            EcsError::StorageExhausted {
                component,
                requested,
                ..
            } => {
                assert_eq!(component, "f32");
                assert_eq!(requested, usize::MAX / 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(storage.is_empty());
        assert!(!storage.contains(e(1)));
    }

    #[test]
    fn zero_capacity_still_grows() {
        let mut storage = ComponentStorage::with_capacity(0);
        storage.store(e(1), 1u8).unwrap();
        storage.store(e(40), 40u8).unwrap();
        assert_eq!(*storage.get(e(40)).unwrap(), 40);
    }

    #[test]
    fn growth_keeps_values() {
        let mut storage = ComponentStorage::with_capacity(2);
        for id in 1..=1000u32 {
            storage.store(e(id), id * 3).unwrap();
        }
        assert_eq!(*storage.get(e(1)).unwrap(), 3);
        assert_eq!(*storage.get(e(999)).unwrap(), 2997);
        assert_eq!(storage.len(), 1000);
    }

    #[test]
    fn iteration_in_slot_order() {
        let mut storage = ComponentStorage::default();
        storage.store(e(20), 200i32).unwrap();
        storage.store(e(10), 100).unwrap();
        let items: Vec<_> = storage.iter().collect();
        assert_eq!(items, vec![(e(20), &200), (e(10), &100)]);
        assert_eq!(storage.as_slice(), &[200, 100]);
        assert_eq!(storage.entities(), &[e(20), e(10)]);
    }
}
