use std::any::type_name;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::entity::Entity;
use crate::error::EcsError;
use crate::mask::{ComponentMask, ComponentRegistry};
use crate::set::ComponentSet;
use crate::storages::ComponentStorages;

/// Per-entity logic over a fixed set of components.
///
/// The dispatcher only hands a system entities that carry every type in
/// [`System::Components`], and passes references to all of them at once:
///
/// ```ignore
/// struct Gravity;
///
/// impl System for Gravity {
///     type Components = (Position, Velocity);
///
///     fn process(&mut self, dt: f32, _entity: Entity, components: Fetched<'_, Self::Components>) {
///         let (pos, vel) = components.into_inner();
///         vel.y -= 9.81 * dt;
///         pos.y += vel.y * dt;
///     }
/// }
/// ```
pub trait System: Send + Sync + 'static {
    type Components: ComponentSet;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    fn process(
        &mut self,
        delta_time: f32,
        entity: Entity,
        components: Fetched<'_, Self::Components>,
    );
}

/// One entity's components, borrowed for a single [`System::process`] call.
pub struct Fetched<'a, C: ComponentSet> {
    refs: C::Refs<'a>,
}

impl<'a, C: ComponentSet> Fetched<'a, C> {
    fn new(refs: C::Refs<'a>) -> Self {
        Self { refs }
    }

    /// The mutable references, in the order of the component tuple.
    pub fn into_inner(self) -> C::Refs<'a> {
        self.refs
    }
}

/// Object-safe view of a [`System`] so systems of different component sets
/// share one list.
trait ErasedSystem: Send + Sync {
    fn system_name(&self) -> &'static str;

    fn run_tracked(
        &mut self,
        delta_time: f32,
        entities: &[Entity],
        storages: &ComponentStorages,
    ) -> Result<(), EcsError>;
}

impl<S: System> ErasedSystem for S {
    fn system_name(&self) -> &'static str {
        self.name()
    }

    fn run_tracked(
        &mut self,
        delta_time: f32,
        entities: &[Entity],
        storages: &ComponentStorages,
    ) -> Result<(), EcsError> {
        if entities.is_empty() {
            return Ok(());
        }
        let mut guards = <S::Components as ComponentSet>::lock(storages)?;
        for &entity in entities {
            let refs = <S::Components as ComponentSet>::fetch(&mut guards, entity)?;
            self.process(delta_time, entity, Fetched::new(refs));
        }
        Ok(())
    }
}

/// Handle to a registered system. Indices follow registration order.
///
/// An id only resolves in the dispatcher (and so the world) that issued it;
/// anywhere else it is [`EcsError::UnknownSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId {
    dispatcher: u64,
    index: usize,
}

impl SystemId {
    pub fn index(&self) -> usize {
        self.index
    }
}

static NEXT_DISPATCHER: AtomicU64 = AtomicU64::new(0);

struct SystemEntry {
    system: Box<dyn ErasedSystem>,
    required: ComponentMask,
    /// Entities in the order they first matched `required`.
    tracked: Vec<Entity>,
    seen: HashSet<Entity>,
}

impl SystemEntry {
    /// Track `entity` if `mask` satisfies this system. Returns `true` if newly tracked.
    fn offer(&mut self, entity: Entity, mask: ComponentMask) -> bool {
        if !mask.contains(self.required) || !self.seen.insert(entity) {
            return false;
        }
        self.tracked.push(entity);
        trace!(system = self.system.system_name(), ?entity, "tracking entity");
        true
    }
}

/// Registered systems, their required masks and tracked entities.
pub struct SystemDispatcher {
    id: u64,
    systems: Vec<SystemEntry>,
}

impl SystemDispatcher {
    pub fn new() -> Self {
        Self {
            id: NEXT_DISPATCHER.fetch_add(1, Ordering::Relaxed),
            systems: Vec::new(),
        }
    }

    /// Register `system`. It runs after every system registered before it.
    ///
    /// Entities that already satisfy the system are not picked up; only
    /// later mask changes are routed to it. A component set that names a
    /// type twice is rejected with [`EcsError::DuplicateComponent`].
    pub fn register<S: System>(
        &mut self,
        system: S,
        registry: &mut ComponentRegistry,
    ) -> Result<SystemId, EcsError> {
        let required = <S::Components as ComponentSet>::mask(registry)?;
        let components = <S::Components as ComponentSet>::component_names();
        if required.count() as usize != components.len() {
            return Err(EcsError::DuplicateComponent {
                system: system.name(),
            });
        }
        let id = SystemId {
            dispatcher: self.id,
            index: self.systems.len(),
        };
        debug!(
            system = system.name(),
            ?components,
            ?required,
            "registered system"
        );
        self.systems.push(SystemEntry {
            system: Box::new(system),
            required,
            tracked: Vec::new(),
            seen: HashSet::new(),
        });
        Ok(id)
    }

    /// Route an entity's new mask to every system it now satisfies.
    pub fn notify_mask_changed(&mut self, entity: Entity, mask: ComponentMask) {
        for entry in &mut self.systems {
            entry.offer(entity, mask);
        }
    }

    /// Route an entity's mask to a single system. Returns `true` if newly tracked.
    pub fn offer(
        &mut self,
        id: SystemId,
        entity: Entity,
        mask: ComponentMask,
    ) -> Result<bool, EcsError> {
        Ok(self.entry_mut(id)?.offer(entity, mask))
    }

    /// Run every system over its tracked entities, in registration order.
    pub fn process_frame(
        &mut self,
        delta_time: f32,
        storages: &ComponentStorages,
    ) -> Result<(), EcsError> {
        for entry in &mut self.systems {
            entry
                .system
                .run_tracked(delta_time, &entry.tracked, storages)?;
        }
        Ok(())
    }

    /// Entities tracked by a system, in tracking order.
    pub fn tracked_entities(&self, id: SystemId) -> Result<&[Entity], EcsError> {
        Ok(&self.entry(id)?.tracked)
    }

    pub fn required_mask(&self, id: SystemId) -> Result<ComponentMask, EcsError> {
        Ok(self.entry(id)?.required)
    }

    pub fn system_name(&self, id: SystemId) -> Result<&'static str, EcsError> {
        Ok(self.entry(id)?.system.system_name())
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn entry(&self, id: SystemId) -> Result<&SystemEntry, EcsError> {
        self.systems
            .get(id.index)
            .filter(|_| id.dispatcher == self.id)
            .ok_or(EcsError::UnknownSystem(id))
    }

    fn entry_mut(&mut self, id: SystemId) -> Result<&mut SystemEntry, EcsError> {
        if id.dispatcher != self.id {
            return Err(EcsError::UnknownSystem(id));
        }
        self.systems
            .get_mut(id.index)
            .ok_or(EcsError::UnknownSystem(id))
    }
}

impl Default for SystemDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
