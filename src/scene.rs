//! Sample scene: a field of spinning cubes

use lattice_core::{ModelMatrix, Origin, Position, Rotation, Scale, Spin, Vec3};
use lattice_ecs::{EcsConfig, EcsError, Entity, SystemId, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::render::DrawQueue;
use crate::settings::SceneSettings;
use crate::systems::{DrawSystem, ModelMatrixSystem, SpinSystem};

/// Handles to the sample's systems, in run order
#[derive(Debug, Clone, Copy)]
pub struct SceneSystems {
    pub spin: SystemId,
    pub model_matrix: SystemId,
    pub draw: SystemId,
}

/// Create a world with the sample systems registered. Draws go to `queue`.
pub fn build_world(
    config: &EcsConfig,
    queue: DrawQueue,
) -> Result<(World, SceneSystems), EcsError> {
    let mut world = World::with_config(config);
    let systems = SceneSystems {
        spin: world.register_system(SpinSystem)?,
        model_matrix: world.register_system(ModelMatrixSystem)?,
        draw: world.register_system(DrawSystem::new(queue))?,
    };
    Ok((world, systems))
}

/// Spawn `settings.entity_count` unit cubes pivoting around their centre,
/// at seeded random positions with random spin.
pub fn spawn_cubes(world: &mut World, settings: &SceneSettings) -> Result<Vec<Entity>, EcsError> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let spread = settings.spread.abs().max(f32::EPSILON);
    let max_spin = settings.max_spin.abs().max(f32::EPSILON);

    let mut cubes = Vec::with_capacity(settings.entity_count as usize);
    for _ in 0..settings.entity_count {
        let position = Vec3::new(
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
            rng.gen_range(-spread..spread),
        );
        let spin = Vec3::new(
            rng.gen_range(-max_spin..max_spin),
            rng.gen_range(-max_spin..max_spin),
            0.0,
        );

        let cube = world.create_entity();
        world.add_component(cube, Position(position))?;
        world.add_component(cube, Origin(Vec3::splat(0.5)))?;
        world.add_default_component::<Scale>(cube)?;
        world.add_default_component::<Rotation>(cube)?;
        world.add_component(cube, Spin(spin))?;
        world.add_default_component::<ModelMatrix>(cube)?;
        cubes.push(cube);
    }

    info!(count = cubes.len(), seed = settings.seed, "Spawned cubes");
    Ok(cubes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene(seed: u64) -> SceneSettings {
        SceneSettings {
            entity_count: 8,
            seed,
            ..Default::default()
        }
    }

    #[test]
    fn every_cube_reaches_every_system() {
        let queue = DrawQueue::new();
        let (mut world, systems) = build_world(&EcsConfig::default(), queue.clone()).unwrap();
        let cubes = spawn_cubes(&mut world, &small_scene(7)).unwrap();

        assert_eq!(world.tracked_entities(systems.spin).unwrap(), cubes.as_slice());
        assert_eq!(world.tracked_entities(systems.model_matrix).unwrap(), cubes.as_slice());
        assert_eq!(world.tracked_entities(systems.draw).unwrap(), cubes.as_slice());

        world.process_frame(0.016).unwrap();
        assert_eq!(queue.entities(), cubes);
    }

    #[test]
    fn same_seed_same_scene() {
        let positions = |seed| {
            let (mut world, _) = build_world(&EcsConfig::default(), DrawQueue::new()).unwrap();
            let cubes = spawn_cubes(&mut world, &small_scene(seed)).unwrap();
            cubes
                .iter()
                .map(|&cube| world.component::<Position>(cube).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(1), positions(1));
        assert_ne!(positions(1), positions(2));
    }

    #[test]
    fn matrices_are_built_before_drawing() {
        let queue = DrawQueue::new();
        let (mut world, _) = build_world(&EcsConfig::default(), queue.clone()).unwrap();
        let cubes = spawn_cubes(&mut world, &small_scene(3)).unwrap();

        queue.begin_frame(lattice_core::Mat4::IDENTITY);
        world.process_frame(0.0).unwrap();
        let draws = queue.drain();

        let position = world.component::<Position>(cubes[0]).unwrap().0;
        let centre = lattice_core::Mat4::from_cols_array_2d(&draws[0].model)
            .transform_point3(Vec3::splat(0.5));
        assert!((centre - position).length() < 1e-4);
    }
}
