//! The running session: one world, one player, and everything the update
//! phase touches.

use std::collections::VecDeque;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::celestial::TimeOfDay;
use crate::config::{ConfigError, SimulationConfig};
use crate::particles::{Particle, ParticleSystem};
use crate::physics::PhysicsEngine;
use crate::player::{Actor, ActorFlags, ActorSnapshot, GameMode, Hotbar, PlayerInput};
use crate::raycast::{self, VoxelHit};
use crate::voxel::{
    BlockChange, TerrainGenerator, VoxelKind, WorldGrid, WorldSeed, WorldType, floor_pos,
};

/// Pending block changes kept for observers; the oldest are dropped first.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// RNG stream reserved for cosmetic particles, separate from terrain.
const PARTICLE_STREAM: u64 = 1;

/// What to create: the inputs that fully determine a fresh world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldDescriptor {
    pub name: String,
    pub seed: WorldSeed,
    pub world_type: WorldType,
    pub game_mode: GameMode,
}

impl Default for WorldDescriptor {
    fn default() -> Self {
        Self {
            name: "New World".to_string(),
            seed: WorldSeed::default(),
            world_type: WorldType::Default,
            game_mode: GameMode::Survival,
        }
    }
}

/// Block and movement counters. Play time is in seconds at the reference
/// frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub blocks_mined: u64,
    pub blocks_placed: u64,
    pub distance_walked: f64,
    pub play_time: f64,
}

impl Statistics {
    pub fn record(&mut self, change: &BlockChange) {
        if change.is_break() {
            self.blocks_mined += 1;
        } else {
            self.blocks_placed += 1;
        }
    }
}

#[derive(Resource)]
pub struct Simulation {
    config: SimulationConfig,
    descriptor: WorldDescriptor,
    physics: PhysicsEngine,
    grid: WorldGrid,
    actor: Actor,
    hotbar: Hotbar,
    particles: ParticleSystem,
    time_of_day: TimeOfDay,
    lifetime: Statistics,
    session: Statistics,
    events: VecDeque<BlockChange>,
}

impl Simulation {
    /// Validate the config, generate the world and spawn the player on top
    /// of the centre column.
    pub fn new(config: SimulationConfig, descriptor: WorldDescriptor) -> Result<Self, ConfigError> {
        config.validate()?;
        let hotbar = Hotbar::new(config.hotbar_kinds()?);

        let grid =
            TerrainGenerator::new(&descriptor.seed, &config.world).generate(descriptor.world_type);
        let centre = config.world.size / 2;
        let spawn = Vec3::new(
            centre as f32 + 0.5,
            grid.surface_height(centre, centre) as f32,
            centre as f32 + 0.5,
        );
        let actor = Actor::new(spawn, descriptor.game_mode);
        info!(
            "World `{}` ready: {} mode, spawn at ({:.1}, {:.1}, {:.1})",
            descriptor.name, descriptor.game_mode, spawn.x, spawn.y, spawn.z
        );

        Ok(Self {
            physics: PhysicsEngine::new(&config),
            particles: ParticleSystem::new(&config.graphics, descriptor.seed.rng(PARTICLE_STREAM)),
            grid,
            actor,
            hotbar,
            time_of_day: TimeOfDay::default(),
            lifetime: Statistics::default(),
            session: Statistics::default(),
            events: VecDeque::new(),
            config,
            descriptor,
        })
    }

    /// One update phase. `dt` is in reference frames.
    pub fn update(&mut self, dt: f32, input: &PlayerInput) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.actor
            .turn(finite_or_zero(input.yaw_delta), finite_or_zero(input.pitch_delta));
        self.actor.flags.set(ActorFlags::SPRINTING, input.sprint);
        self.actor.flags.set(ActorFlags::SNEAKING, input.sneak);
        if let Some(slot) = input.hotbar_select {
            self.hotbar.select(slot);
        }
        if input.break_block {
            self.break_block();
        }
        if input.place_block {
            self.place_block();
        }

        let walked = self.physics.step(&mut self.actor, &self.grid, input, dt) as f64;
        self.lifetime.distance_walked += walked;
        self.session.distance_walked += walked;

        if self.config.game.day_night_cycle {
            self.time_of_day.advance(dt);
        }
        self.particles.tick(dt);

        let seconds = dt as f64 / 60.0;
        self.lifetime.play_time += seconds;
        self.session.play_time += seconds;
    }

    /// The block the player is looking at, within reach.
    pub fn target(&self) -> Option<VoxelHit> {
        self.cast_from_eye(self.config.player.reach_distance)
    }

    /// Cast along the view direction. Distance is capped at the view distance.
    pub fn cast_from_eye(&self, max_distance: f32) -> Option<VoxelHit> {
        let eye = self.actor.eye_position(self.config.player.eye_height);
        let dir = raycast::look_direction(self.actor.rotation.pitch, self.actor.rotation.yaw);
        let max_distance = max_distance.min(self.config.view_distance());
        raycast::cast(&self.grid, eye, dir, max_distance, self.config.player.ray_step)
    }

    /// Break the targeted block. Unbreakable blocks and adventure mode refuse.
    pub fn break_block(&mut self) -> Option<BlockChange> {
        if !self.descriptor.game_mode.can_modify_world() {
            return None;
        }
        let hit = self.target()?;
        if hit.kind.is_unbreakable() {
            debug!("Refusing to break unbreakable {} at {}", hit.kind, hit.pos);
            return None;
        }
        self.set_block(hit.pos, VoxelKind::Air)
    }

    /// Place the selected hotbar block against the targeted face.
    pub fn place_block(&mut self) -> Option<BlockChange> {
        if !self.descriptor.game_mode.can_modify_world() {
            return None;
        }
        let kind = self.hotbar.selected_kind()?;
        let cell = self.target()?.previous?;
        if self.grid.get_voxel(cell) != VoxelKind::Air {
            return None;
        }
        if kind.is_solid() && self.physics.overlaps_cell(self.actor.position, cell) {
            debug!("Refusing to place {} inside the player at {}", kind, cell);
            return None;
        }
        self.set_block(cell, kind)
    }

    /// Write a block and notify observers. Out-of-range cells are ignored.
    pub fn set_block(&mut self, pos: IVec3, kind: VoxelKind) -> Option<BlockChange> {
        let change = self.grid.set_voxel(pos, kind)?;
        debug!("Block {} changed: {} -> {}", change.pos, change.old, change.new);

        self.lifetime.record(&change);
        self.session.record(&change);

        // Debris takes the colour of whatever is visible: the broken block,
        // or the one just placed.
        let color = if change.is_break() {
            change.old.color()
        } else {
            change.new.color()
        };
        self.particles
            .spawn(change.center(), color, self.config.graphics.particles_per_block);

        if self.events.len() == EVENT_QUEUE_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(change);
        Some(change)
    }

    pub fn get(&self, x: f32, y: f32, z: f32) -> VoxelKind {
        self.grid.get(x, y, z)
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32, kind: VoxelKind) -> Option<BlockChange> {
        self.set_block(floor_pos(x, y, z)?, kind)
    }

    /// Take every block change since the last drain, oldest first.
    pub fn drain_block_events(&mut self) -> impl Iterator<Item = BlockChange> + '_ {
        self.events.drain(..)
    }

    pub fn pending_block_events(&self) -> usize {
        self.events.len()
    }

    /// Reset the session counters, keeping lifetime totals.
    pub fn start_session(&mut self) {
        self.session = Statistics::default();
    }

    /// Seed lifetime totals from an earlier run.
    pub fn restore_statistics(&mut self, lifetime: Statistics) {
        self.lifetime = lifetime;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &WorldDescriptor {
        &self.descriptor
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Direct access for health, food and experience changes.
    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn actor_snapshot(&self) -> ActorSnapshot {
        self.actor.snapshot()
    }

    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn set_particles_enabled(&mut self, enabled: bool) {
        self.particles.set_enabled(enabled);
    }

    pub fn time_of_day(&self) -> &TimeOfDay {
        &self.time_of_day
    }

    pub fn time_of_day_mut(&mut self) -> &mut TimeOfDay {
        &mut self.time_of_day
    }

    pub fn statistics(&self) -> &Statistics {
        &self.lifetime
    }

    pub fn session_statistics(&self) -> &Statistics {
        &self.session
    }

    pub fn check_collision(&self, pos: Vec3) -> bool {
        self.physics.check_collision(&self.grid, pos)
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
