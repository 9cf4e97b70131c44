//! Systems that animate and draw the sample scene

use lattice_core::{model_matrix, ModelMatrix, Origin, Position, Rotation, Scale, Spin};
use lattice_ecs::{Entity, Fetched, System};

use crate::render::GeometrySink;

/// Integrates [`Spin`] into [`Rotation`].
pub struct SpinSystem;

impl System for SpinSystem {
    type Components = (Rotation, Spin);

    fn process(&mut self, delta_time: f32, _: Entity, components: Fetched<'_, Self::Components>) {
        let (rotation, spin) = components.into_inner();
        rotation.0 += spin.0 * delta_time;
    }
}

/// Rebuilds each entity's [`ModelMatrix`] from its transform components.
pub struct ModelMatrixSystem;

impl System for ModelMatrixSystem {
    type Components = (Position, Origin, Scale, Rotation, ModelMatrix);

    fn process(&mut self, _: f32, _: Entity, components: Fetched<'_, Self::Components>) {
        let (position, origin, scale, rotation, matrix) = components.into_inner();
        matrix.0 = model_matrix(*position, *origin, *scale, *rotation);
    }
}

/// Submits one draw per entity.
pub struct DrawSystem<S> {
    sink: S,
}

impl<S: GeometrySink> DrawSystem<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: GeometrySink> System for DrawSystem<S> {
    type Components = (ModelMatrix,);

    fn name(&self) -> &'static str {
        "DrawSystem"
    }

    fn process(&mut self, _: f32, entity: Entity, components: Fetched<'_, Self::Components>) {
        let (matrix,) = components.into_inner();
        self.sink.submit(entity, matrix.0);
    }
}
