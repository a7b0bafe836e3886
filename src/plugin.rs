use bevy::app::AppExit;
use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::scheduler::{Host, ManualClock, Scheduler};
use crate::simulation::{Simulation, WorldDescriptor};
use crate::voxel::BlockChange;

/// Per-frame ordering: drive the scheduler, then fan out what happened.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Drive,
    Observe,
}

/// Scheduler fed from Bevy's frame time instead of a wall clock.
#[derive(Resource)]
pub struct SimulationScheduler(pub Scheduler<ManualClock>);

/// The embedding host. Without one the simulation sits idle.
#[derive(Resource)]
pub struct SimulationHost(pub Box<dyn Host + Send + Sync>);

impl SimulationHost {
    pub fn new(host: impl Host + Send + Sync + 'static) -> Self {
        Self(Box::new(host))
    }
}

/// A block changed in the world; for sound, telemetry and persistence.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChanged(pub BlockChange);

pub struct SimulationPlugin {
    pub config: SimulationConfig,
    pub descriptor: WorldDescriptor,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig, descriptor: WorldDescriptor) -> Self {
        Self { config, descriptor }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BlockChanged>().configure_sets(
            Update,
            (SimulationSet::Drive, SimulationSet::Observe).chain(),
        );

        let simulation = match Simulation::new(self.config.clone(), self.descriptor.clone()) {
            Ok(simulation) => simulation,
            Err(err) => {
                error!("Cannot start simulation: {}", err);
                app.add_systems(Startup, request_exit);
                return;
            }
        };
        let scheduler = Scheduler::new(ManualClock::default(), self.config.graphics.max_fps);

        app.insert_resource(self.descriptor.seed)
            .insert_resource(simulation)
            .insert_resource(SimulationScheduler(scheduler))
            .add_systems(
                Update,
                drive_simulation
                    .in_set(SimulationSet::Drive)
                    .run_if(resource_exists::<SimulationHost>),
            )
            .add_systems(Update, publish_block_changes.in_set(SimulationSet::Observe));
    }
}

fn drive_simulation(
    time: Res<Time>,
    mut simulation: ResMut<Simulation>,
    mut scheduler: ResMut<SimulationScheduler>,
    mut host: ResMut<SimulationHost>,
    mut app_exit: MessageWriter<AppExit>,
) {
    let scheduler = &mut scheduler.0;
    scheduler.clock_mut().advance(time.delta());
    scheduler.poll(&mut simulation, host.0.as_mut());
    if !scheduler.is_running() {
        app_exit.write(AppExit::Success);
    }
}

fn publish_block_changes(
    mut simulation: ResMut<Simulation>,
    mut changes: MessageWriter<BlockChanged>,
) {
    for change in simulation.drain_block_events() {
        debug!("{} -> {} at {}", change.old, change.new, change.pos);
        changes.write(BlockChanged(change));
    }
}

fn request_exit(mut app_exit: MessageWriter<AppExit>) {
    app_exit.write(AppExit::error());
}
