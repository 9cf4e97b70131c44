//! Sample settings with persistence
//!
//! Settings are saved to `~/.config/lattice/settings.toml`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lattice_core::ClockConfig;
use lattice_ecs::EcsConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All sample settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ECS tuning
    pub ecs: EcsConfig,
    /// Scene generation
    pub scene: SceneSettings,
    /// Frame loop
    pub run: RunSettings,
    /// Camera and viewport
    pub camera: CameraSettings,
}

impl Settings {
    /// `~/.config/lattice/settings.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lattice").join("settings.toml"))
    }

    /// Load from [`default_path`](Self::default_path). Anything short of a
    /// readable, valid file falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(settings)) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Ok(None) => {
                info!(path = %path.display(), "No settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("{:#}, using default settings", e);
                Self::default()
            }
        }
    }

    /// Read settings from `path`. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let settings = Self::parse(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(Some(settings))
    }

    /// Parse settings from TOML. Missing keys take their default.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save to [`default_path`](Self::default_path).
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    /// Write settings to `path`, creating parent directories. The output is
    /// parsed back first so a file that would not load is never written.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        let reparsed = Self::parse(&content).context("Serialized settings do not parse")?;
        anyhow::ensure!(&reparsed == self, "Settings do not survive a save/load cycle");

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

/// Scene generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Number of cubes to spawn
    pub entity_count: u32,
    /// Seed for positions and spin
    pub seed: u64,
    /// Cubes are placed in a cube of this half-extent around the origin
    pub spread: f32,
    /// Maximum angular speed in radians per second
    pub max_spin: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            entity_count: 1000,
            seed: 0x1a77_1ce5,
            spread: 50.0,
            max_spin: 2.0,
        }
    }
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Number of frames to run
    pub frames: u32,
    /// Raw delta fed to the clock each frame, in seconds
    pub frame_delta: f32,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub clock: ClockConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 120,
            frame_delta: 1.0 / 60.0,
            log_level: "info".to_string(),
            clock: ClockConfig::default(),
        }
    }
}

/// Camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub width: u32,
    pub height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 1.0,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 150.0],
            width: 1920,
            height: 1080,
        }
    }
}

impl CameraSettings {
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
