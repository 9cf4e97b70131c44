use std::collections::TryReserveError;

use crate::entity::Entity;
use crate::system::SystemId;

/// Errors raised by the ECS. All of them are contract violations on the
/// caller's side; none are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    #[error("cannot assign a mask bit to '{component}': all {capacity} bits are taken")]
    MaskCapacityExceeded {
        component: &'static str,
        capacity: u32,
    },

    #[error("{entity:?} has no '{component}' component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("no storage exists for component '{component}'")]
    MissingStorage { component: &'static str },

    #[error("unknown entity {0:?}")]
    UnknownEntity(Entity),

    #[error("failed to grow '{component}' storage to {requested} slots")]
    StorageExhausted {
        component: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("storage for '{component}' is already borrowed")]
    StorageBusy { component: &'static str },

    #[error("system '{system}' lists the same component type more than once")]
    DuplicateComponent { system: &'static str },

    #[error("unknown system {0:?}")]
    UnknownSystem(SystemId),
}
