//! Headless voxel world simulation: a bounded block grid, seeded terrain,
//! axis-separated player physics, stepped ray casting, debris particles and a
//! frame-paced update loop, with a Bevy plugin for embedding.

pub mod celestial;
pub mod config;
pub mod particles;
pub mod physics;
pub mod player;
pub mod plugin;
pub mod raycast;
pub mod scheduler;
pub mod simulation;
pub mod voxel;

pub use config::{ConfigError, SimulationConfig};
pub use plugin::{BlockChanged, SimulationHost, SimulationPlugin};
pub use scheduler::{Host, ManualClock, Scheduler, SystemClock, TimeSource, TimingSnapshot};
pub use simulation::{Simulation, Statistics, WorldDescriptor};
