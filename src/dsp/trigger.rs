use super::fixed::Audio;

/// Edge latch over a digital gate input.
///
/// `update` samples the line once per control cycle; each transition sets
/// the matching latch, and the accessors consume it; a latched edge is
/// reported exactly once.
#[derive(Debug, Clone, Default)]
pub struct GateTrigger {
    state: bool,
    rising: bool,
    falling: bool,
}

impl GateTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, level: bool) {
        if level && !self.state {
            self.rising = true;
        }
        if !level && self.state {
            self.falling = true;
        }
        self.state = level;
    }

    pub fn state(&self) -> bool {
        self.state
    }

    /// Read-and-clear.
    pub fn rising_edge(&mut self) -> bool {
        std::mem::take(&mut self.rising)
    }

    /// Read-and-clear.
    pub fn falling_edge(&mut self) -> bool {
        std::mem::take(&mut self.falling)
    }
}

/// Hysteresis trigger over an analog signal.
///
/// Fires only when the input crosses `high` while armed; re-arms only when
/// the input falls back below `low`. The dead band between the two
/// thresholds is what keeps a noisy signal near a single threshold from
/// chattering.
#[derive(Debug, Clone)]
pub struct SchmidtTrigger {
    low: Audio,
    high: Audio,
    state: bool,
    armed: bool,
}

impl SchmidtTrigger {
    pub fn new(low: Audio, high: Audio) -> Self {
        Self {
            low,
            high,
            state: false,
            armed: true,
        }
    }

    /// Returns true on the sample where the input crosses the high
    /// threshold from below the low one.
    pub fn process(&mut self, input: Audio) -> bool {
        if input <= self.low {
            self.state = false;
            self.armed = true;
            return false;
        }
        if self.armed && input >= self.high {
            self.armed = false;
            self.state = true;
            return true;
        }
        false
    }

    pub fn state(&self) -> bool {
        self.state
    }
}

/// Measures the tick interval between rising clock edges.
///
/// Before the first pair of edges the interval defaults to one second of
/// samples (one assumed beat); it is never zero.
#[derive(Debug, Clone)]
pub struct ClockRateDetector {
    samples_since_edge: u32,
    last_interval: u32,
}

impl ClockRateDetector {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples_since_edge: 0,
            last_interval: sample_rate.max(1),
        }
    }

    /// Call once per tick with the edge-detected clock state. The counter
    /// includes the trigger tick itself, so edges at tick 0 and tick N
    /// measure an interval of exactly N.
    pub fn process(&mut self, triggered: bool) {
        if triggered {
            if self.samples_since_edge > 0 {
                self.last_interval = self.samples_since_edge;
            }
            self.samples_since_edge = 0;
        }
        self.samples_since_edge = self.samples_since_edge.saturating_add(1);
    }

    /// Ticks between the two most recent rising edges.
    pub fn interval(&self) -> u32 {
        self.last_interval
    }

    pub fn ticks_since_edge(&self) -> u32 {
        self.samples_since_edge
    }
}
