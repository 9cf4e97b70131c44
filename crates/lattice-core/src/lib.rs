//! Lattice Core - Shared types for the Lattice sample
//!
//! This crate provides:
//! - Mathematical primitives (re-exported from glam)
//! - The plain-data components the sample scene is built from
//! - A frame clock that produces the per-frame delta time
//! - A fly camera with a validated perspective projection

pub mod camera;
pub mod components;
pub mod time;

pub use camera::{perspective, Camera, CameraError};
pub use components::{model_matrix, ModelMatrix, Origin, Position, Rotation, Scale, Spin};
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{ClockConfig, FrameClock};
