//! Frame pacing.
//!
//! One cycle = measure the gap since the previous cycle, run the update
//! phase unless paused, then always hand the frame to the host for
//! presentation. Time comes from a [`TimeSource`] so tests and the Bevy
//! integration can drive the loop without a wall clock.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use bevy::prelude::*;

use crate::player::PlayerInput;
use crate::simulation::Simulation;

/// One reference frame; `delta_time == 1.0` means exactly this long.
pub const REFERENCE_FRAME: Duration = Duration::from_micros(16_670);
/// Longest gap a single cycle will simulate.
pub const MAX_FRAME_GAP: Duration = Duration::from_millis(100);
/// FPS is re-measured once per this many frames.
pub const FPS_SAMPLE_FRAMES: u64 = 60;

pub trait TimeSource {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to. Sleeping advances it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new(start: Duration) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Jump to an absolute time. Going backwards is allowed; the scheduler
    /// treats it as a zero gap.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

/// The embedding application: supplies input and presents frames.
pub trait Host {
    /// Input for the coming update. Only called when not paused.
    fn poll_input(&mut self, timing: &TimingSnapshot) -> PlayerInput;

    /// Present the current state. `Break` stops the loop after this cycle.
    fn present(&mut self, simulation: &Simulation, timing: &TimingSnapshot) -> ControlFlow<()>;

    /// `Some(true)` pauses, `Some(false)` resumes. Checked at the start of
    /// every cycle.
    fn pause_request(&mut self) -> Option<bool> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimingSnapshot {
    pub fps: f32,
    /// Gap since the previous cycle in reference frames, at most 6.
    pub delta_time: f32,
    /// Time since the first cycle.
    pub elapsed: Duration,
    pub frame_count: u64,
    pub paused: bool,
}

#[derive(Debug)]
pub struct Scheduler<T: TimeSource> {
    clock: T,
    target_interval: Duration,
    started: Option<Duration>,
    last_cycle: Option<Duration>,
    last_fps_sample: Duration,
    next_due: Duration,
    frame_count: u64,
    fps: f32,
    delta_time: f32,
    paused: bool,
    running: bool,
}

impl<T: TimeSource> Scheduler<T> {
    pub fn new(clock: T, target_fps: u32) -> Self {
        Self {
            clock,
            target_interval: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            started: None,
            last_cycle: None,
            last_fps_sample: Duration::ZERO,
            next_due: Duration::ZERO,
            frame_count: 0,
            fps: 0.0,
            delta_time: 0.0,
            paused: false,
            running: true,
        }
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pause(&mut self) {
        if !self.paused {
            info!("Simulation paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("Simulation resumed");
        }
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Ask the loop to stop. Takes effect before the next cycle.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn timing(&self) -> TimingSnapshot {
        let now = self.clock.now();
        TimingSnapshot {
            fps: self.fps,
            delta_time: self.delta_time,
            elapsed: self
                .started
                .map_or(Duration::ZERO, |start| now.saturating_sub(start)),
            frame_count: self.frame_count,
            paused: self.paused,
        }
    }

    /// Run exactly one cycle. Returns how long to wait before the next one
    /// to stay under the FPS ceiling.
    pub fn cycle<H: Host + ?Sized>(
        &mut self,
        simulation: &mut Simulation,
        host: &mut H,
    ) -> Duration {
        let now = self.clock.now();
        let start = *self.started.get_or_insert(now);
        if self.last_cycle.is_none() {
            self.last_fps_sample = start;
        }

        // A clock that jumped backwards yields a zero gap.
        let gap = self
            .last_cycle
            .map_or(Duration::ZERO, |last| now.saturating_sub(last))
            .min(MAX_FRAME_GAP);
        self.delta_time = gap.as_secs_f32() / REFERENCE_FRAME.as_secs_f32();
        self.last_cycle = Some(now);
        self.next_due = now + self.target_interval;

        self.frame_count += 1;
        if self.frame_count % FPS_SAMPLE_FRAMES == 0 {
            let window = now.saturating_sub(self.last_fps_sample);
            if !window.is_zero() {
                self.fps = FPS_SAMPLE_FRAMES as f32 / window.as_secs_f32();
                debug!("{:.1} fps over the last {} frames", self.fps, FPS_SAMPLE_FRAMES);
            }
            self.last_fps_sample = now;
        }

        match host.pause_request() {
            Some(true) => self.pause(),
            Some(false) => self.resume(),
            None => {}
        }

        let timing = self.timing();
        if !self.paused {
            let input = host.poll_input(&timing);
            simulation.update(self.delta_time, &input);
        }
        if host.present(simulation, &timing).is_break() {
            info!("Host requested stop after frame {}", self.frame_count);
            self.running = false;
        }

        self.next_due.saturating_sub(self.clock.now())
    }

    /// Run a cycle if one is due. Returns whether it ran.
    pub fn poll<H: Host + ?Sized>(&mut self, simulation: &mut Simulation, host: &mut H) -> bool {
        if !self.running {
            return false;
        }
        if self.last_cycle.is_some() && self.clock.now() < self.next_due {
            return false;
        }
        self.cycle(simulation, host);
        true
    }

    /// Cycle until stopped, sleeping through the clock between frames. A
    /// scheduler that was already stopped returns without running a cycle.
    pub fn run<H: Host + ?Sized>(&mut self, simulation: &mut Simulation, host: &mut H) {
        while self.running {
            let wait = self.cycle(simulation, host);
            if self.running && !wait.is_zero() {
                self.clock.sleep(wait);
            }
        }
    }
}
