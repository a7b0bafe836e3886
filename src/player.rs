use std::fmt;
use std::str::FromStr;

use bevy::math::Vec3;
use bitflags::bitflags;
use thiserror::Error;

use crate::voxel::VoxelKind;

/// Health and food are both measured in half-icons.
pub const MAX_HEALTH: u8 = 20;
pub const MAX_FOOD: u8 = 20;

/// Experience needed per level.
pub const EXPERIENCE_PER_LEVEL: u32 = 100;

/// Pitch limit just short of straight up/down.
pub const PITCH_LIMIT: f32 = 1.54;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActorFlags: u8 {
        const ON_GROUND = 1 << 0;
        const FLYING = 1 << 1;
        const SPRINTING = 1 << 2;
        const SNEAKING = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Hardcore,
}

impl GameMode {
    pub fn starts_flying(self) -> bool {
        self == GameMode::Creative
    }

    pub fn starting_health(self) -> u8 {
        match self {
            GameMode::Hardcore => 1,
            _ => MAX_HEALTH,
        }
    }

    /// Adventure players can look at blocks but not change them.
    pub fn can_modify_world(self) -> bool {
        self != GameMode::Adventure
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Hardcore => "hardcore",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game mode `{0}`")]
pub struct UnknownGameMode(pub String);

impl FromStr for GameMode {
    type Err = UnknownGameMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "survival" => Ok(GameMode::Survival),
            "creative" => Ok(GameMode::Creative),
            "adventure" => Ok(GameMode::Adventure),
            "hardcore" => Ok(GameMode::Hardcore),
            _ => Err(UnknownGameMode(s.to_string())),
        }
    }
}

/// Pitch and yaw in radians. Positive pitch looks down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookAngles {
    pub pitch: f32,
    pub yaw: f32,
}

/// The kinematic player. Position is the centre of the feet.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub position: Vec3,
    pub rotation: LookAngles,
    pub velocity: Vec3,
    pub flags: ActorFlags,
    health: u8,
    food: u8,
    pub experience: u32,
    pub level: u32,
}

impl Actor {
    pub fn new(position: Vec3, mode: GameMode) -> Self {
        let mut flags = ActorFlags::empty();
        flags.set(ActorFlags::FLYING, mode.starts_flying());
        Self {
            position,
            rotation: LookAngles::default(),
            velocity: Vec3::ZERO,
            flags,
            health: mode.starting_health(),
            food: MAX_FOOD,
            experience: 0,
            level: 0,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.flags.contains(ActorFlags::ON_GROUND)
    }

    pub fn flying(&self) -> bool {
        self.flags.contains(ActorFlags::FLYING)
    }

    pub fn sprinting(&self) -> bool {
        self.flags.contains(ActorFlags::SPRINTING)
    }

    pub fn sneaking(&self) -> bool {
        self.flags.contains(ActorFlags::SNEAKING)
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn food(&self) -> u8 {
        self.food
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, MAX_HEALTH as i32) as u8;
    }

    pub fn set_food(&mut self, food: i32) {
        self.food = food.clamp(0, MAX_FOOD as i32) as u8;
    }

    pub fn add_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount);
        self.level = self.experience / EXPERIENCE_PER_LEVEL;
    }

    /// Apply a look delta; pitch is clamped so the view never flips over.
    pub fn turn(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.rotation.yaw += yaw_delta;
        self.rotation.pitch = (self.rotation.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn eye_position(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::Y * eye_height
    }

    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            position: self.position,
            rotation: self.rotation,
            velocity: self.velocity,
            flags: self.flags,
            health: self.health,
            food: self.food,
            experience: self.experience,
            level: self.level,
        }
    }
}

/// Read-only copy of the actor for UI and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub position: Vec3,
    pub rotation: LookAngles,
    pub velocity: Vec3,
    pub flags: ActorFlags,
    pub health: u8,
    pub food: u8,
    pub experience: u32,
    pub level: u32,
}

/// Normalized intent for one tick. Device translation happens upstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Strafe, -1 (left) to 1 (right).
    pub move_x: f32,
    /// Forward, -1 (back) to 1 (forward).
    pub move_z: f32,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
    pub sprint: bool,
    pub sneak: bool,
    /// Jump when grounded; ascend while flying.
    pub jump: bool,
    pub break_block: bool,
    pub place_block: bool,
    pub hotbar_select: Option<usize>,
}

impl PlayerInput {
    /// Movement intent clamped into `[-1, 1]²`.
    pub fn movement(&self) -> (f32, f32) {
        (clamp_axis(self.move_x), clamp_axis(self.move_z))
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotbarSlot {
    pub kind: VoxelKind,
    pub count: u32,
}

/// Block-type bookkeeping for placement. Counts are informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotbar {
    slots: Vec<HotbarSlot>,
    selected: usize,
}

impl Hotbar {
    pub const STACK: u32 = 64;

    pub fn new(kinds: impl IntoIterator<Item = VoxelKind>) -> Self {
        Self {
            slots: kinds
                .into_iter()
                .map(|kind| HotbarSlot {
                    kind,
                    count: Self::STACK,
                })
                .collect(),
            selected: 0,
        }
    }

    pub fn slots(&self) -> &[HotbarSlot] {
        &self.slots
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.slots.len() {
            self.selected = index;
        }
    }

    pub fn selected_kind(&self) -> Option<VoxelKind> {
        self.slots.get(self.selected).map(|slot| slot.kind)
    }
}
