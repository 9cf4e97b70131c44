use std::any::type_name;

use parking_lot::MappedRwLockWriteGuard;

use crate::component::{Component, ComponentStorage};
use crate::entity::Entity;
use crate::error::EcsError;
use crate::mask::{ComponentMask, ComponentRegistry};
use crate::storages::ComponentStorages;

/// A compile-time list of component types a system requires.
///
/// Implemented for tuples of one to eight component types, e.g.
/// `(Position,)` or `(Position, Scale, Rotation)`. Every type in the tuple
/// must be distinct.
pub trait ComponentSet: 'static {
    /// Write guards over every storage in the set, held for one system run.
    type Guards<'w>;

    /// Mutable references to one entity's components, in tuple order.
    type Refs<'a>;

    /// Type names of the components in the set.
    fn component_names() -> Vec<&'static str>;

    /// Union of the mask bits of every component in the set.
    fn mask(registry: &mut ComponentRegistry) -> Result<ComponentMask, EcsError>;

    /// Borrow every storage in the set.
    fn lock(storages: &ComponentStorages) -> Result<Self::Guards<'_>, EcsError>;

    /// Fetch every component of `entity` from already locked storages.
    fn fetch<'a>(
        guards: &'a mut Self::Guards<'_>,
        entity: Entity,
    ) -> Result<Self::Refs<'a>, EcsError>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            type Guards<'w> = ($(MappedRwLockWriteGuard<'w, ComponentStorage<$name>>,)+);
            type Refs<'a> = ($(&'a mut $name,)+);

            fn component_names() -> Vec<&'static str> {
                vec![$(type_name::<$name>()),+]
            }

            fn mask(registry: &mut ComponentRegistry) -> Result<ComponentMask, EcsError> {
                let mut mask = ComponentMask::EMPTY;
                $(mask |= registry.get_or_assign::<$name>()?;)+
                Ok(mask)
            }

            fn lock(storages: &ComponentStorages) -> Result<Self::Guards<'_>, EcsError> {
                Ok(($(storages.write::<$name>()?,)+))
            }

            fn fetch<'a>(
                guards: &'a mut Self::Guards<'_>,
                entity: Entity,
            ) -> Result<Self::Refs<'a>, EcsError> {
                let ($($name,)+) = guards;
                Ok(($($name.get_mut(entity)?,)+))
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
