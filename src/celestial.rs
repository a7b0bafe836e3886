use std::f32::consts::TAU;

/// Length of a full day in ticks.
pub const DAY_LENGTH: f32 = 24000.0;
/// Ticks gained per reference frame.
pub const TICKS_PER_FRAME: f32 = 20.0;
/// New worlds start at morning.
pub const MORNING: f32 = 6000.0;

/// Day/night clock in Minecraft-style ticks, `[0, 24000)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOfDay {
    ticks: f32,
    /// Whether the clock advances at all
    pub paused: bool,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::new(MORNING)
    }
}

impl TimeOfDay {
    pub fn new(ticks: f32) -> Self {
        let mut time = Self {
            ticks: 0.0,
            paused: false,
        };
        time.set(ticks);
        time
    }

    pub fn ticks(&self) -> f32 {
        self.ticks
    }

    pub fn set(&mut self, ticks: f32) {
        self.ticks = if ticks.is_finite() {
            ticks.rem_euclid(DAY_LENGTH)
        } else {
            MORNING
        };
    }

    pub fn advance(&mut self, dt: f32) {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.set(self.ticks + dt * TICKS_PER_FRAME);
    }

    /// Sun angle in radians; a full turn per day.
    pub fn sun_angle(&self) -> f32 {
        self.ticks / DAY_LENGTH * TAU
    }

    /// Sun altitude: 1 overhead, -1 straight below the horizon.
    pub fn sun_height(&self) -> f32 {
        self.sun_angle().sin()
    }

    /// Night runs from tick 13000 to 23000.
    pub fn is_night(&self) -> bool {
        self.ticks > 13000.0 && self.ticks < 23000.0
    }

    /// Sky colour blended from the sun altitude.
    pub fn sky_color(&self) -> [u8; 3] {
        let h = self.sun_height();
        let (day, dusk) = if h > 0.0 {
            ([135.0, 206.0, 235.0], [30.0, 30.0, 80.0])
        } else {
            ([30.0, 30.0, 80.0], [10.0, 10.0, 30.0])
        };
        let t = h.abs();
        let mix = |i: usize| (day[i] * t + dusk[i] * (1.0 - t)).floor() as u8;
        [mix(0), mix(1), mix(2)]
    }
}
