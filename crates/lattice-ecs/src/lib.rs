//! Lattice ECS - Entity Component System
//!
//! An archetype-free ECS for the Lattice rendering sample. Components live in
//! per-type dense arrays with a sparse entity index. Every component type owns
//! one bit of a [`ComponentMask`]; systems declare the set of components they
//! need and are handed an entity the moment its mask becomes a superset of
//! theirs. [`World::process_frame`] then runs each system over its tracked
//! entities in registration and insertion order.

mod component;
mod config;
mod entity;
mod error;
mod mask;
mod set;
mod storages;
mod system;
mod world;

pub use component::{Component, ComponentStorage};
pub use config::EcsConfig;
pub use entity::{Entity, EntityManager};
pub use error::EcsError;
pub use mask::{ComponentMask, ComponentRegistry};
pub use set::ComponentSet;
pub use storages::ComponentStorages;
pub use system::{Fetched, System, SystemDispatcher, SystemId};
pub use world::World;
