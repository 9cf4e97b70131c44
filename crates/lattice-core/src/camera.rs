//! Fly camera with yaw/pitch look and a validated perspective projection

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Radians of rotation per unit of look input
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Pitch limit in radians, just short of straight up/down
pub const PITCH_LIMIT: f32 = 1.55;

/// Errors that can occur when building a projection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("field of view must be in (0, pi) radians, got {0}")]
    InvalidFov(f32),

    #[error("near plane must be positive, got {0}")]
    InvalidNear(f32),

    #[error("far plane must be positive, got {0}")]
    InvalidFar(f32),

    #[error("viewport must have a positive size, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
}

/// Right-handed perspective projection with depth mapped to 0..1.
///
/// `far` may be `f32::INFINITY` for an infinite far plane.
pub fn perspective(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Result<Mat4, CameraError> {
    if !(fov > 0.0 && fov < PI) {
        return Err(CameraError::InvalidFov(fov));
    }
    if !(near > 0.0) {
        return Err(CameraError::InvalidNear(near));
    }
    if !(far > 0.0) {
        return Err(CameraError::InvalidFar(far));
    }

    if far == f32::INFINITY {
        Ok(Mat4::perspective_infinite_rh(fov, aspect_ratio, near))
    } else {
        Ok(Mat4::perspective_rh(fov, aspect_ratio, near, far))
    }
}

/// Fly camera. Matrices are rebuilt whenever an input changes.
#[derive(Debug, Clone)]
pub struct Camera {
    fov: f32,
    near: f32,
    far: f32,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    width: f32,
    height: f32,
    look_direction: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Create a camera for a `width` x `height` viewport
    pub fn new(
        fov: f32,
        near: f32,
        far: f32,
        width: f32,
        height: f32,
    ) -> Result<Self, CameraError> {
        let mut camera = Self {
            fov,
            near,
            far,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            width: 1.0,
            height: 1.0,
            look_direction: -Vec3::Z,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.window_resized(width, height)?;
        camera.update_view();
        Ok(camera)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Unit vector the camera faces
    pub fn look_direction(&self) -> Vec3 {
        self.look_direction
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Move by `motion` expressed in camera space
    pub fn move_by(&mut self, motion: Vec3) {
        if motion == Vec3::ZERO {
            return;
        }
        self.position += self.rotation() * motion;
        self.update_view();
    }

    /// Rotate by a look delta, e.g. mouse movement in pixels
    pub fn look_around(&mut self, delta: Vec2) {
        self.yaw += delta.x * LOOK_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_view();
    }

    /// Rebuild the projection for a new viewport size
    pub fn window_resized(&mut self, width: f32, height: f32) -> Result<(), CameraError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(CameraError::InvalidViewport { width, height });
        }
        self.projection = perspective(self.fov, width / height, self.near, self.far)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    fn update_view(&mut self) {
        self.look_direction = self.rotation() * -Vec3::Z;
        self.view = Mat4::look_at_rh(self.position, self.position + self.look_direction, Vec3::Y);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 1.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            width: 16.0,
            height: 9.0,
            look_direction: -Vec3::Z,
            view: Mat4::look_at_rh(Vec3::ZERO, -Vec3::Z, Vec3::Y),
            projection: Mat4::perspective_rh(1.0, 16.0 / 9.0, 1.0, 1000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perspective_validates_inputs() {
        assert_eq!(perspective(0.0, 1.0, 1.0, 10.0), Err(CameraError::InvalidFov(0.0)));
        assert_eq!(perspective(PI, 1.0, 1.0, 10.0), Err(CameraError::InvalidFov(PI)));
        assert_eq!(perspective(1.0, 1.0, 0.0, 10.0), Err(CameraError::InvalidNear(0.0)));
        assert_eq!(perspective(1.0, 1.0, 1.0, -5.0), Err(CameraError::InvalidFar(-5.0)));
        assert!(matches!(
            perspective(f32::NAN, 1.0, 1.0, 10.0),
            Err(CameraError::InvalidFov(_))
        ));
    }

    #[test]
    fn perspective_maps_depth_zero_to_one() {
        let m = perspective(1.0, 1.0, 1.0, 100.0).unwrap();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -1.0));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn infinite_far_plane() {
        let m = perspective(1.0, 1.0, 1.0, f32::INFINITY).unwrap();
        assert_eq!(m.z_axis.z, -1.0);
        assert_eq!(m.w_axis.z, -1.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.look_around(Vec2::new(0.0, 10_000.0));
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.look_around(Vec2::new(500.0, -100_000.0));
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
        assert!((camera.yaw() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn move_follows_look_direction() {
        let mut camera = Camera::default();
        camera.move_by(-Vec3::Z * 5.0);
        assert!((camera.position() - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
        assert!((camera.look_direction() + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn resize_rejects_empty_viewport() {
        let mut camera = Camera::default();
        let before = camera.projection_matrix();
        assert!(camera.window_resized(0.0, 600.0).is_err());
        assert_eq!(camera.projection_matrix(), before);

        camera.window_resized(800.0, 800.0).unwrap();
        assert_eq!(camera.aspect_ratio(), 1.0);
    }

    #[test]
    fn new_validates() {
        assert!(Camera::new(4.0, 1.0, 1000.0, 800.0, 600.0).is_err());
        let camera = Camera::new(1.0, 0.1, 500.0, 800.0, 600.0).unwrap();
        assert_eq!(camera.far(), 500.0);
    }
}
