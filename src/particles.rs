//! Cosmetic debris particles. They never touch the block grid.

use std::collections::VecDeque;

use bevy::math::Vec3;
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::GraphicsConfig;

pub const PARTICLE_LIFE: f32 = 1.0;
pub const PARTICLE_GRAVITY: f32 = 0.02;
/// Life lost per reference frame.
pub const PARTICLE_DECAY: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: [f32; 3],
    pub size: f32,
    pub life: f32,
    pub max_life: f32,
    pub gravity: f32,
}

impl Particle {
    /// Remaining life as a fraction, handy for fading.
    pub fn opacity(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    enabled: bool,
    capacity: usize,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(config: &GraphicsConfig, rng: StdRng) -> Self {
        Self {
            particles: VecDeque::new(),
            enabled: config.particles,
            capacity: config.max_particles,
            rng,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Turning particles off also clears the live ones.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.particles.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Burst of `count` particles from `center`. The oldest particles are
    /// dropped once capacity is reached.
    pub fn spawn(&mut self, center: Vec3, color: [f32; 3], count: usize) {
        if !self.enabled || self.capacity == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() == self.capacity {
                self.particles.pop_front();
            }
            let velocity = Vec3::new(
                self.rng.gen_range(-0.1..0.1),
                self.rng.gen_range(0.0..0.3),
                self.rng.gen_range(-0.1..0.1),
            );
            self.particles.push_back(Particle {
                position: center,
                velocity,
                color,
                size: self.rng.gen_range(0.1..0.2),
                life: PARTICLE_LIFE,
                max_life: PARTICLE_LIFE,
                gravity: PARTICLE_GRAVITY,
            });
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for p in self.particles.iter_mut() {
            p.position += p.velocity * dt;
            p.velocity.y -= p.gravity * dt;
            p.life -= PARTICLE_DECAY * dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
