//! Components used by the sample scene

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

/// Pivot point in model space. Scaling and rotation happen around it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin(pub Vec3);

/// Per-axis scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale(pub Vec3);

impl Default for Scale {
    fn default() -> Self {
        Self(Vec3::ONE)
    }
}

/// Euler angles in radians: x = pitch, y = yaw, z = roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation(pub Vec3);

impl Rotation {
    /// Yaw, then pitch, then roll.
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.0.y, self.0.x, self.0.z)
    }
}

/// Angular velocity in radians per second, per Euler axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spin(pub Vec3);

/// Model-to-world matrix, rebuilt every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMatrix(pub Mat4);

impl Default for ModelMatrix {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// `T(position) * R(rotation) * S(scale) * T(-origin)`
pub fn model_matrix(position: Position, origin: Origin, scale: Scale, rotation: Rotation) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale.0, rotation.to_quat(), position.0)
        * Mat4::from_translation(-origin.0)
}
