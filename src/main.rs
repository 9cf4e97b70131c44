//! Lattice - headless sample for the Lattice ECS
//!
//! Spawns a field of spinning cubes, runs a fixed number of frames and
//! records the draws a renderer would submit.

mod render;
mod scene;
mod settings;
mod systems;

use anyhow::{Context, Result};
use lattice_core::{Camera, FrameClock, ModelMatrix, Position, Rotation, Vec2, Vec3};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use render::DrawQueue;
use settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::load();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.run.log_level))
        .context("Invalid log level in settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Lattice sample...");

    if std::env::args().any(|arg| arg == "--save-settings") {
        settings.save().context("Failed to save settings")?;
    }

    let (width, height) = settings.camera.resolution();
    let mut camera = Camera::new(
        settings.camera.fov,
        settings.camera.near,
        settings.camera.far,
        width as f32,
        height as f32,
    )
    .context("Invalid camera settings")?;
    camera.set_position(Vec3::from_array(settings.camera.position));

    let queue = DrawQueue::new();
    let (mut world, systems) =
        scene::build_world(&settings.ecs, queue.clone()).context("Failed to register systems")?;
    let cubes = scene::spawn_cubes(&mut world, &settings.scene).context("Failed to spawn scene")?;
    let spinning = world.tracked_entities(systems.spin)?.len();
    let transformed = world.tracked_entities(systems.model_matrix)?.len();
    debug!(
        spinning,
        transformed,
        component_types = world.registry().len(),
        "Scene ready"
    );

    let mut clock = FrameClock::new(settings.run.clock.clone());
    let mut uploaded_bytes = 0usize;
    for frame in 0..settings.run.frames {
        // Slow drift so the view matrix changes between frames.
        camera.look_around(Vec2::new(1.0, 0.0));

        let delta_time = clock.tick(settings.run.frame_delta);
        queue.begin_frame(camera.view_projection());
        world
            .process_frame(delta_time)
            .with_context(|| format!("Frame {frame} failed"))?;

        let submitted = queue.len();
        let draws = queue.drain();
        uploaded_bytes += bytemuck::cast_slice::<_, u8>(&draws[..]).len();
        debug!(frame, submitted, delta_time, "Frame complete");
    }

    let drawn = world.tracked_entities(systems.draw)?.len();
    info!(
        frames = clock.frame_count,
        simulated_seconds = clock.total_time,
        drawn,
        uploaded_bytes,
        "Run finished"
    );

    if let Some(&first) = cubes.first() {
        let position = world.component::<Position>(first)?;
        let rotation = world.component::<Rotation>(first)?;
        info!(entity = %first, position = ?position.0, rotation = ?rotation.0, "Sample cube");

        // Inspector-style edit through a live reference.
        world.component_mut::<Position>(first)?.0 = Vec3::ZERO;
        queue.begin_frame(camera.view_projection());
        world.process_frame(0.0)?;
        let matrix = world.component::<ModelMatrix>(first)?;
        debug!(entity = %first, translation = ?matrix.0.w_axis, "Moved sample cube to the origin");
    }

    info!("Lattice sample shutdown complete");
    Ok(())
}
