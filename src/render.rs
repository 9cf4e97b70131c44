//! Draw submission
//!
//! Systems hand finished model matrices to a [`GeometrySink`]. The sample
//! records them as GPU-ready uniforms instead of talking to a device.

use std::sync::Arc;

use glam::Mat4;
use lattice_ecs::Entity;
use parking_lot::Mutex;

/// Something that accepts geometry to draw with a transform
pub trait GeometrySink: Send + Sync + 'static {
    fn submit(&mut self, entity: Entity, model: Mat4);
}

/// Per-draw uniform block, laid out for direct upload
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub mvp: [[f32; 4]; 4],
}

#[derive(Default)]
struct Recorded {
    view_projection: Mat4,
    draws: Vec<DrawUniforms>,
    entities: Vec<Entity>,
}

/// Shared recording sink. Clones write to the same queue, so one handle can
/// live inside a system while the frame loop drains another.
#[derive(Clone, Default)]
pub struct DrawQueue {
    inner: Arc<Mutex<Recorded>>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear last frame's draws and set the camera for this one
    pub fn begin_frame(&self, view_projection: Mat4) {
        let mut recorded = self.inner.lock();
        recorded.view_projection = view_projection;
        recorded.draws.clear();
        recorded.entities.clear();
    }

    /// Take every draw recorded since [`begin_frame`](Self::begin_frame)
    pub fn drain(&self) -> Vec<DrawUniforms> {
        let mut recorded = self.inner.lock();
        recorded.entities.clear();
        std::mem::take(&mut recorded.draws)
    }

    /// Entities drawn so far this frame, in submission order
    pub fn entities(&self) -> Vec<Entity> {
        self.inner.lock().entities.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeometrySink for DrawQueue {
    fn submit(&mut self, entity: Entity, model: Mat4) {
        let mut recorded = self.inner.lock();
        let mvp = recorded.view_projection * model;
        recorded.draws.push(DrawUniforms {
            model: model.to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
        });
        recorded.entities.push(entity);
    }
}
