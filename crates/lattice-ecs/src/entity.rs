use std::fmt;

use crate::error::EcsError;
use crate::mask::ComponentMask;

/// An entity handle. Ids start at 1 and are never reused; 0 is [`Entity::NONE`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u32);

impl Entity {
    /// The reserved "no entity" id.
    pub const NONE: Entity = Entity(0);

    /// Create an entity from a raw id (mainly for testing).
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The numeric id of this entity.
    pub fn id(&self) -> u32 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub(crate) fn slot(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out entity ids and remembers which components each entity carries.
pub struct EntityManager {
    /// Indexed by entity id. Slot 0 belongs to [`Entity::NONE`] and stays empty.
    masks: Vec<ComponentMask>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            masks: vec![ComponentMask::EMPTY],
        }
    }

    /// Allocate the next entity id.
    pub fn create(&mut self) -> Entity {
        let entity = Entity(self.masks.len() as u32);
        self.masks.push(ComponentMask::EMPTY);
        entity
    }

    /// Whether `entity` was handed out by this manager.
    pub fn contains(&self, entity: Entity) -> bool {
        !entity.is_none() && entity.slot() < self.masks.len()
    }

    /// The union of all component bits attached to `entity` so far.
    pub fn mask(&self, entity: Entity) -> Option<ComponentMask> {
        if entity.is_none() {
            return None;
        }
        self.masks.get(entity.slot()).copied()
    }

    /// Union `bits` into the entity's mask and return the new mask.
    pub fn add_bits(
        &mut self,
        entity: Entity,
        bits: ComponentMask,
    ) -> Result<ComponentMask, EcsError> {
        if !self.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let mask = &mut self.masks[entity.slot()];
        *mask |= bits;
        Ok(*mask)
    }

    /// Iterate over every entity with its current mask, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, ComponentMask)> + '_ {
        self.masks
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, mask)| (Entity(id as u32), *mask))
    }

    /// Number of entities created.
    pub fn len(&self) -> usize {
        self.masks.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}
