//! Simulation configuration.
//!
//! Every tunable lives here so game constants stay out of the algorithms.
//! Defaults match the classic browser build; a TOML file can override any
//! subset of fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::voxel::constants::{
    FLAT_GROUND_HEIGHT, MAX_WORLD_HEIGHT, MAX_WORLD_SIZE, SEA_LEVEL, WORLD_HEIGHT, WORLD_SIZE,
};
use crate::voxel::terrain::TerrainProfile;
use crate::voxel::voxel_kind::{UnknownBlockName, VoxelKind};

/// Horizontal size of a render chunk, used to turn `render_distance` into blocks.
const RENDER_CHUNK: f32 = 16.0;

/// Upper bound for speeds, jump force, gravity and terminal velocity, in
/// blocks per reference frame.
pub const MAX_PLAYER_RATE: f32 = 10.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    UnknownBlock(#[from] UnknownBlockName),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub graphics: GraphicsConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub size: i32,
    pub height: i32,
    pub sea_level: i32,
    pub flat_ground_height: i32,
    pub default_profile: TerrainProfile,
    pub amplified_profile: TerrainProfile,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: WORLD_SIZE,
            height: WORLD_HEIGHT,
            sea_level: SEA_LEVEL,
            flat_ground_height: FLAT_GROUND_HEIGHT,
            default_profile: TerrainProfile::DEFAULT,
            amplified_profile: TerrainProfile::AMPLIFIED,
        }
    }
}

/// Movement speeds in blocks per reference frame (1/60 s).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub walking: f32,
    pub sprinting: f32,
    pub sneaking: f32,
    pub flying: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            walking: 0.12,
            sprinting: 0.18,
            sneaking: 0.06,
            flying: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub height: f32,
    pub eye_height: f32,
    /// Half-width of the player's bounding box on X and Z.
    pub radius: f32,
    pub speed: SpeedConfig,
    pub jump_force: f32,
    pub gravity: f32,
    /// Maximum downward speed.
    pub terminal_velocity: f32,
    pub reach_distance: f32,
    /// Ray march increment in blocks.
    pub ray_step: f32,
    /// Block names for the hotbar slots, left to right.
    pub hotbar: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            eye_height: 1.6,
            radius: 0.3,
            speed: SpeedConfig::default(),
            jump_force: 0.45,
            gravity: 0.028,
            terminal_velocity: 1.0,
            reach_distance: 5.0,
            ray_step: 0.1,
            hotbar: [
                "grass",
                "dirt",
                "stone",
                "wood",
                "leaves",
                "sand",
                "glass",
                "cobblestone",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Spawn debris particles when blocks change.
    pub particles: bool,
    /// Particles spawned per block change.
    pub particles_per_block: usize,
    pub max_particles: usize,
    /// In chunks; bounds presentation ray queries.
    pub render_distance: u32,
    pub max_fps: u32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            particles: true,
            particles_per_block: 8,
            max_particles: 1024,
            render_distance: 8,
            max_fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub day_night_cycle: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            day_night_cycle: true,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if !(1..=MAX_WORLD_SIZE).contains(&world.size) {
            return Err(invalid(
                "world.size",
                format!("must be between 1 and {MAX_WORLD_SIZE}"),
            ));
        }
        if !(4..=MAX_WORLD_HEIGHT).contains(&world.height) {
            return Err(invalid(
                "world.height",
                format!("must be between 4 and {MAX_WORLD_HEIGHT}"),
            ));
        }
        if !(0..world.height).contains(&world.sea_level) {
            return Err(invalid("world.sea_level", "must lie inside the world height"));
        }
        if !(0..world.height).contains(&world.flat_ground_height) {
            return Err(invalid(
                "world.flat_ground_height",
                "must lie inside the world height",
            ));
        }

        let player = &self.player;
        if !(player.radius > 0.0 && player.radius < 0.5) {
            return Err(invalid("player.radius", "must be in (0, 0.5)"));
        }
        if !(player.height > 0.0 && player.height < world.height as f32) {
            return Err(invalid("player.height", "must be positive and below world.height"));
        }
        if !(0.0..=player.height).contains(&player.eye_height) {
            return Err(invalid("player.eye_height", "must be within the player height"));
        }
        let rate = 0.0..=MAX_PLAYER_RATE;
        let speed = &player.speed;
        if [speed.walking, speed.sprinting, speed.sneaking, speed.flying]
            .iter()
            .any(|s| !rate.contains(s))
        {
            return Err(invalid(
                "player.speed",
                format!("speeds must be between 0 and {MAX_PLAYER_RATE}"),
            ));
        }
        if !rate.contains(&player.jump_force) {
            return Err(invalid(
                "player.jump_force",
                format!("must be between 0 and {MAX_PLAYER_RATE}"),
            ));
        }
        if !rate.contains(&player.gravity) {
            return Err(invalid(
                "player.gravity",
                format!("must be between 0 and {MAX_PLAYER_RATE}"),
            ));
        }
        if !(player.terminal_velocity > 0.0 && player.terminal_velocity <= MAX_PLAYER_RATE) {
            return Err(invalid(
                "player.terminal_velocity",
                format!("must be in (0, {MAX_PLAYER_RATE}]"),
            ));
        }
        if !(player.reach_distance > 0.0) {
            return Err(invalid("player.reach_distance", "must be positive"));
        }
        if !(player.ray_step > 0.0 && player.ray_step <= 1.0) {
            return Err(invalid("player.ray_step", "must be in (0, 1]"));
        }
        if player.hotbar.is_empty() {
            return Err(invalid("player.hotbar", "needs at least one slot"));
        }
        self.hotbar_kinds()?;

        if self.graphics.max_fps == 0 {
            return Err(invalid("graphics.max_fps", "must be positive"));
        }
        Ok(())
    }

    /// Resolve hotbar block names against the block registry.
    pub fn hotbar_kinds(&self) -> Result<Vec<VoxelKind>, ConfigError> {
        self.player
            .hotbar
            .iter()
            .map(|name| name.parse::<VoxelKind>().map_err(ConfigError::from))
            .collect()
    }

    /// Minimum wall-clock time between scheduler cycles.
    pub fn target_frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.graphics.max_fps.max(1) as f64)
    }

    /// Farthest distance presentation queries may look.
    pub fn view_distance(&self) -> f32 {
        self.graphics.render_distance as f32 * RENDER_CHUNK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.world.size, 32);
        assert_eq!(config.world.height, 64);
        assert_eq!(config.hotbar_kinds().unwrap().len(), 8);
        assert_eq!(config.target_frame_interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [world]
            size = 16

            [player.speed]
            flying = 0.3

            [graphics]
            particles = false
            max_fps = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.world.size, 16);
        assert_eq!(config.world.height, 64);
        assert_eq!(config.player.speed.flying, 0.3);
        assert_eq!(config.player.speed.walking, 0.12);
        assert!(!config.graphics.particles);
        assert_eq!(config.graphics.max_fps, 30);
    }

    #[test]
    fn test_amplified_profile_is_configurable() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [world.amplified_profile]
            elevation_scale = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.amplified_profile.elevation_scale, 30.0);
        assert_eq!(config.world.amplified_profile.octaves, 4);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = SimulationConfig::from_toml_str("[player]\nradius = 0.7").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.radius", .. }));

        let err = SimulationConfig::from_toml_str("[world]\nsea_level = 100").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world.sea_level", .. }));

        let err = SimulationConfig::from_toml_str("[player]\nhotbar = [\"obsidian\"]").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBlock(_)));
    }

    #[test]
    fn test_rejects_oversized_world() {
        let err = SimulationConfig::from_toml_str("[world]\nsize = 100000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world.size", .. }));

        let err = SimulationConfig::from_toml_str("[world]\nheight = 100000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "world.height", .. }));

        let config = SimulationConfig::from_toml_str("[world]\nsize = 512\nheight = 256").unwrap();
        assert_eq!((config.world.size, config.world.height), (512, 256));
    }

    #[test]
    fn test_rejects_runaway_player_rates() {
        let err = SimulationConfig::from_toml_str("[player.speed]\nwalking = 1e9").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.speed", .. }));

        let err = SimulationConfig::from_toml_str("[player]\njump_force = 1e9").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.jump_force", .. }));

        let err = SimulationConfig::from_toml_str("[player]\ngravity = -0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.gravity", .. }));

        let err = SimulationConfig::from_toml_str("[player]\nterminal_velocity = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player.terminal_velocity", .. }));

        let mut config = SimulationConfig::default();
        config.player.gravity = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "player.gravity", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SimulationConfig::from_toml_str("[world\nsize = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
