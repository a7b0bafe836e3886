//! Player kinematics against the block grid.
//!
//! Movement is resolved one axis at a time in the fixed order X, Z, Y. An
//! axis that would end inside a solid block is cancelled and its velocity
//! zeroed. This is not swept collision, so long moves are split into
//! sub-steps no longer than [`MAX_SUBSTEP`] blocks.

use bevy::math::{IVec3, Vec3};

use crate::config::{SimulationConfig, SpeedConfig};
use crate::player::{Actor, ActorFlags, PlayerInput};
use crate::voxel::WorldGrid;

/// Longest distance tested in a single collision probe. Must stay below the
/// thinnest overlap span (one block plus the player's width).
pub const MAX_SUBSTEP: f32 = 0.5;

const AXIS_X: usize = 0;
const AXIS_Y: usize = 1;
const AXIS_Z: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsEngine {
    radius: f32,
    height: f32,
    speed: SpeedConfig,
    jump_force: f32,
    gravity: f32,
    terminal_velocity: f32,
    world_size: f32,
    world_height: f32,
}

impl PhysicsEngine {
    pub fn new(config: &SimulationConfig) -> Self {
        let player = &config.player;
        Self {
            radius: player.radius,
            height: player.height,
            speed: player.speed,
            jump_force: player.jump_force,
            gravity: player.gravity,
            terminal_velocity: player.terminal_velocity,
            world_size: config.world.size as f32,
            world_height: config.world.height as f32,
        }
    }

    /// Speed precedence: flying > sprinting > sneaking > walking.
    pub fn speed_for(&self, flags: ActorFlags) -> f32 {
        if flags.contains(ActorFlags::FLYING) {
            self.speed.flying
        } else if flags.contains(ActorFlags::SPRINTING) {
            self.speed.sprinting
        } else if flags.contains(ActorFlags::SNEAKING) {
            self.speed.sneaking
        } else {
            self.speed.walking
        }
    }

    /// Advance the actor by one tick. Returns the horizontal distance covered.
    pub fn step(&self, actor: &mut Actor, grid: &WorldGrid, input: &PlayerInput, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let speed = self.speed_for(actor.flags);

        // Intent is (strafe, forward); rotate it by yaw into world space.
        let (move_x, move_z) = input.movement();
        let (sin_yaw, cos_yaw) = actor.rotation.yaw.sin_cos();
        let dir_x = move_x * cos_yaw + move_z * sin_yaw;
        let dir_z = -move_x * sin_yaw + move_z * cos_yaw;
        let len = (dir_x * dir_x + dir_z * dir_z).sqrt();
        if len > 0.0 {
            actor.velocity.x = dir_x / len * speed;
            actor.velocity.z = dir_z / len * speed;
        } else {
            actor.velocity.x = 0.0;
            actor.velocity.z = 0.0;
        }

        if actor.flying() {
            actor.velocity.y = if input.jump {
                speed
            } else if input.sneak {
                -speed
            } else {
                0.0
            };
        } else {
            if input.jump && actor.on_ground() {
                actor.velocity.y = self.jump_force;
            }
            actor.velocity.y =
                (actor.velocity.y - self.gravity * dt).max(-self.terminal_velocity);
        }

        let start = actor.position;
        let mut pos = actor.position;

        if self.sweep_axis(grid, &mut pos, AXIS_X, actor.velocity.x * dt) {
            actor.velocity.x = 0.0;
        }
        if self.sweep_axis(grid, &mut pos, AXIS_Z, actor.velocity.z * dt) {
            actor.velocity.z = 0.0;
        }
        let falling = actor.velocity.y < 0.0;
        if self.sweep_axis(grid, &mut pos, AXIS_Y, actor.velocity.y * dt) {
            // Landed on something, or bumped a ceiling.
            actor.flags.set(ActorFlags::ON_GROUND, falling);
            actor.velocity.y = 0.0;
        } else {
            actor.flags.remove(ActorFlags::ON_GROUND);
        }

        actor.position = self.clamp_to_world(pos);
        let moved = actor.position - start;
        (moved.x * moved.x + moved.z * moved.z).sqrt()
    }

    /// Move `pos` along one axis, probing in sub-steps. Stops at the last
    /// free position and returns true if a probe collided.
    fn sweep_axis(&self, grid: &WorldGrid, pos: &mut Vec3, axis: usize, delta: f32) -> bool {
        if delta == 0.0 || !delta.is_finite() {
            return false;
        }
        // Anything longer would be clamped back into the world anyway.
        let reach = self.world_size.max(self.world_height) + 1.0;
        let delta = delta.clamp(-reach, reach);
        let steps = (delta.abs() / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let increment = delta / steps as f32;
        for _ in 0..steps {
            let mut candidate = *pos;
            candidate[axis] += increment;
            if self.check_collision(grid, candidate) {
                return true;
            }
            *pos = candidate;
        }
        false
    }

    /// Does the player's box at `pos` overlap any solid block?
    ///
    /// The box spans `x ± radius`, `y .. y + height`, `z ± radius`. Touching
    /// faces do not count as overlap.
    pub fn check_collision(&self, grid: &WorldGrid, pos: Vec3) -> bool {
        let min = Vec3::new(pos.x - self.radius, pos.y, pos.z - self.radius);
        let max = Vec3::new(pos.x + self.radius, pos.y + self.height, pos.z + self.radius);
        if !(min.is_finite() && max.is_finite()) {
            return false;
        }
        let lo = min.floor().as_ivec3();
        let hi = max.floor().as_ivec3();

        for bx in lo.x..=hi.x {
            for by in lo.y..=hi.y {
                for bz in lo.z..=hi.z {
                    let cell = IVec3::new(bx, by, bz);
                    if !grid.get_voxel(cell).is_solid() {
                        continue;
                    }
                    let cell_min = cell.as_vec3();
                    let cell_max = cell_min + Vec3::ONE;
                    if min.cmplt(cell_max).all() && max.cmpgt(cell_min).all() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Does the player's box at `pos` overlap the given cell?
    pub fn overlaps_cell(&self, pos: Vec3, cell: IVec3) -> bool {
        let min = Vec3::new(pos.x - self.radius, pos.y, pos.z - self.radius);
        let max = Vec3::new(pos.x + self.radius, pos.y + self.height, pos.z + self.radius);
        let cell_min = cell.as_vec3();
        min.cmplt(cell_min + Vec3::ONE).all() && max.cmpgt(cell_min).all()
    }

    pub fn clamp_to_world(&self, pos: Vec3) -> Vec3 {
        Vec3::new(
            pos.x.clamp(0.5, self.world_size - 0.5),
            pos.y.clamp(0.0, (self.world_height - self.height).max(0.0)),
            pos.z.clamp(0.5, self.world_size - 0.5),
        )
    }
}
