use std::any::type_name;

use parking_lot::MappedRwLockReadGuard;
use tracing::debug;

use crate::component::{Component, ComponentStorage};
use crate::config::EcsConfig;
use crate::entity::{Entity, EntityManager};
use crate::error::EcsError;
use crate::mask::{ComponentMask, ComponentRegistry};
use crate::storages::ComponentStorages;
use crate::system::{System, SystemDispatcher, SystemId};

/// The central ECS container. Owns the component registry, every component
/// storage, the entity manager and the system dispatcher.
pub struct World {
    registry: ComponentRegistry,
    storages: ComponentStorages,
    entities: EntityManager,
    dispatcher: SystemDispatcher,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(&EcsConfig::default())
    }

    pub fn with_config(config: &EcsConfig) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            storages: ComponentStorages::new(config.initial_capacity),
            entities: EntityManager::new(),
            dispatcher: SystemDispatcher::new(),
        }
    }

    // ---- Entity management ----

    /// Create a new entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Whether `entity` was created by this world.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Number of entities created.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The union of the components attached to `entity`.
    pub fn entity_mask(&self, entity: Entity) -> Option<ComponentMask> {
        self.entities.mask(entity)
    }

    // ---- Component management ----

    /// Attach `component` to `entity` and notify every system the entity now
    /// satisfies. Attaching a type the entity already has overwrites it.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<(), EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let bit = self.registry.get_or_assign::<T>()?;
        self.storages.get_or_create::<T>().store(entity, component)?;
        let mask = self.entities.add_bits(entity, bit)?;
        self.dispatcher.notify_mask_changed(entity, mask);
        Ok(())
    }

    /// Attach `T::default()` to `entity`.
    pub fn add_default_component<T: Component + Default>(
        &mut self,
        entity: Entity,
    ) -> Result<(), EcsError> {
        self.add_component(entity, T::default())
    }

    /// Whether `entity` carries a `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        match (self.registry.mask_of::<T>(), self.entities.mask(entity)) {
            (Some(bit), Some(mask)) => mask.contains(bit),
            _ => false,
        }
    }

    /// Mutable access to a live component, e.g. for an inspector UI.
    ///
    /// The borrow ends before the world can be touched again, so it can never
    /// outlive a storage reallocation.
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        match self.storages.get_mut::<T>() {
            Some(storage) => storage.get_mut(entity),
            None => Err(missing::<T>(entity)),
        }
    }

    /// Run `f` with a shared reference to `entity`'s `T`.
    pub fn with_component<T: Component, R>(
        &self,
        entity: Entity,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, EcsError> {
        if !self.entities.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let storage = self
            .storages
            .read::<T>()
            .ok_or_else(|| missing::<T>(entity))?;
        Ok(f(storage.get(entity)?))
    }

    /// A copy of `entity`'s `T`.
    pub fn component<T: Component + Copy>(&self, entity: Entity) -> Result<T, EcsError> {
        self.with_component(entity, |component: &T| *component)
    }

    /// Shared access to the whole storage for `T`, e.g. to upload the dense
    /// array in one go.
    pub fn storage<T: Component>(
        &self,
    ) -> Option<MappedRwLockReadGuard<'_, ComponentStorage<T>>> {
        self.storages.read::<T>()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    // ---- Systems ----

    /// Register a system. Systems run in registration order.
    ///
    /// Only entities whose mask changes after this call are tracked; call
    /// [`backfill_system`](Self::backfill_system) to pick up entities that
    /// already qualify.
    pub fn register_system<S: System>(&mut self, system: S) -> Result<SystemId, EcsError> {
        self.dispatcher.register(system, &mut self.registry)
    }

    /// Offer every existing entity to one system, in id order. Returns the
    /// number of entities newly tracked.
    pub fn backfill_system(&mut self, id: SystemId) -> Result<usize, EcsError> {
        let system = self.dispatcher.system_name(id)?;
        let mut added = 0;
        for (entity, mask) in self.entities.iter() {
            if self.dispatcher.offer(id, entity, mask)? {
                added += 1;
            }
        }
        debug!(system, added, "backfilled system");
        Ok(added)
    }

    /// Run every system once over its tracked entities.
    pub fn process_frame(&mut self, delta_time: f32) -> Result<(), EcsError> {
        self.dispatcher.process_frame(delta_time, &self.storages)
    }

    pub fn tracked_entities(&self, id: SystemId) -> Result<&[Entity], EcsError> {
        self.dispatcher.tracked_entities(id)
    }

    /// The components a system requires.
    pub fn required_mask(&self, id: SystemId) -> Result<ComponentMask, EcsError> {
        self.dispatcher.required_mask(id)
    }

    /// Number of registered systems.
    pub fn system_count(&self) -> usize {
        self.dispatcher.len()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<T>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: type_name::<T>(),
    }
}
