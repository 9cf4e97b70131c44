use std::any::{type_name, TypeId};
use std::collections::HashMap;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::debug;

use crate::component::{AnyStorage, Component, ComponentStorage};
use crate::error::EcsError;

/// Type-map of every component storage in a world.
///
/// Each storage sits behind its own lock so a system can write to several
/// storages at once. Locks are only taken through `&self`; with `&mut self`
/// storages are reached directly.
pub struct ComponentStorages {
    map: HashMap<TypeId, RwLock<Box<dyn AnyStorage>>>,
    initial_capacity: usize,
}

impl ComponentStorages {
    pub(crate) fn new(initial_capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            initial_capacity,
        }
    }

    /// The storage for `T`, created on first use.
    pub(crate) fn get_or_create<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        let initial_capacity = self.initial_capacity;
        self.map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!(
                    component = type_name::<T>(),
                    initial_capacity, "created component storage"
                );
                RwLock::new(Box::new(ComponentStorage::<T>::with_capacity(
                    initial_capacity,
                )))
            })
            .get_mut()
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .expect("component type mismatch")
    }

    pub(crate) fn get_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.map
            .get_mut(&TypeId::of::<T>())?
            .get_mut()
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Shared access to the storage for `T`.
    pub fn read<T: Component>(&self) -> Option<MappedRwLockReadGuard<'_, ComponentStorage<T>>> {
        let lock = self.map.get(&TypeId::of::<T>())?;
        RwLockReadGuard::try_map(lock.read(), |storage| {
            storage.as_any().downcast_ref::<ComponentStorage<T>>()
        })
        .ok()
    }

    /// Exclusive access to the storage for `T`.
    ///
    /// Fails with [`EcsError::StorageBusy`] instead of blocking if the storage
    /// is already borrowed, which happens when a component set names the same
    /// type twice.
    pub fn write<T: Component>(
        &self,
    ) -> Result<MappedRwLockWriteGuard<'_, ComponentStorage<T>>, EcsError> {
        let component = type_name::<T>();
        let lock = self
            .map
            .get(&TypeId::of::<T>())
            .ok_or(EcsError::MissingStorage { component })?;
        let guard = lock
            .try_write()
            .ok_or(EcsError::StorageBusy { component })?;
        RwLockWriteGuard::try_map(guard, |storage| {
            storage.as_any_mut().downcast_mut::<ComponentStorage<T>>()
        })
        .map_err(|_| EcsError::MissingStorage { component })
    }

    /// Number of component types with a storage.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total number of components across all storages.
    pub fn component_count(&self) -> usize {
        self.map.values().map(|lock| lock.read().len()).sum()
    }
}
