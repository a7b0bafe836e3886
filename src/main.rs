use std::ops::ControlFlow;
use std::path::PathBuf;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use voxsim::player::{GameMode, PlayerInput};
use voxsim::scheduler::{Host, TimingSnapshot};
use voxsim::voxel::{WorldSeed, WorldType};
use voxsim::{Simulation, SimulationConfig, SimulationHost, SimulationPlugin, WorldDescriptor};

/// Command line and environment settings for a run.
struct LaunchOptions {
    descriptor: WorldDescriptor,
    config_path: Option<PathBuf>,
    /// Stop after this many frames; 0 runs forever.
    frames: u64,
}

fn main() -> AppExit {
    let options = parse_options();

    let config = match &options.config_path {
        Some(path) => match SimulationConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("voxsim: {err}");
                return AppExit::error();
            }
        },
        None => SimulationConfig::default(),
    };
    let frame_interval = config.target_frame_interval();

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame_interval)))
        .add_plugins(LogPlugin::default())
        .add_plugins(SimulationPlugin::new(config, options.descriptor))
        .insert_resource(SimulationHost::new(Autopilot::new(options.frames)))
        .run()
}

/// Look up `--long`/`-short` on the command line, then `VOXSIM_<env>`.
fn lookup(args: &[String], long: &str, short: &str, env: &str) -> Option<String> {
    for i in 0..args.len() {
        if (args[i] == long || args[i] == short) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    std::env::var(format!("VOXSIM_{env}")).ok()
}

fn parse_options() -> LaunchOptions {
    let args: Vec<String> = std::env::args().collect();

    // Non-numeric seeds fall back to the default inside `WorldSeed::parse`.
    let seed = WorldSeed::parse(lookup(&args, "--seed", "-s", "SEED").as_deref());

    let world_type = lookup(&args, "--world-type", "-w", "WORLD_TYPE")
        .and_then(|raw| match raw.parse::<WorldType>() {
            Ok(world_type) => Some(world_type),
            Err(err) => {
                eprintln!("voxsim: {err}, using default terrain");
                None
            }
        })
        .unwrap_or_default();

    let game_mode = lookup(&args, "--mode", "-m", "MODE")
        .and_then(|raw| match raw.parse::<GameMode>() {
            Ok(mode) => Some(mode),
            Err(err) => {
                eprintln!("voxsim: {err}, using survival");
                None
            }
        })
        .unwrap_or_default();

    let name =
        lookup(&args, "--name", "-n", "WORLD_NAME").unwrap_or_else(|| "New World".to_string());
    let config_path = lookup(&args, "--config", "-c", "CONFIG").map(PathBuf::from);
    let frames = lookup(&args, "--frames", "-f", "FRAMES")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(600);

    LaunchOptions {
        descriptor: WorldDescriptor {
            name,
            seed,
            world_type,
            game_mode,
        },
        config_path,
        frames,
    }
}

/// Stand-in player for headless runs: wanders in a slow circle, hops now and
/// then, digs and builds, and logs what it sees once a second.
struct Autopilot {
    frames: u64,
    presented: u64,
}

impl Autopilot {
    fn new(frames: u64) -> Self {
        Self {
            frames,
            presented: 0,
        }
    }
}

impl Host for Autopilot {
    fn poll_input(&mut self, timing: &TimingSnapshot) -> PlayerInput {
        let frame = timing.frame_count;
        PlayerInput {
            move_z: 1.0,
            yaw_delta: 0.01,
            pitch_delta: if frame < 30 { 0.02 } else { 0.0 },
            sprint: frame % 600 > 300,
            jump: frame % 90 == 0,
            break_block: frame % 120 == 60,
            place_block: frame % 120 == 0,
            hotbar_select: Some(((frame / 240) % 8) as usize),
            ..Default::default()
        }
    }

    fn present(&mut self, simulation: &Simulation, timing: &TimingSnapshot) -> ControlFlow<()> {
        self.presented += 1;
        if timing.frame_count % 60 == 0 {
            let actor = simulation.actor_snapshot();
            let target = simulation
                .target()
                .map_or_else(|| "nothing".to_string(), |hit| hit.kind.to_string());
            let stats = simulation.session_statistics();
            info!(
                "frame {} | {:.0} fps | pos ({:.1}, {:.1}, {:.1}) | looking at {} | {} particles | \
                 mined {} placed {} walked {:.1} | {}",
                timing.frame_count,
                timing.fps,
                actor.position.x,
                actor.position.y,
                actor.position.z,
                target,
                simulation.particles().count(),
                stats.blocks_mined,
                stats.blocks_placed,
                stats.distance_walked,
                if simulation.time_of_day().is_night() { "night" } else { "day" },
            );
        }
        if self.frames != 0 && self.presented >= self.frames {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
