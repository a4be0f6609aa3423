//! Frame timing: simulation clock, per-phase telemetry and frame pacing

use std::time::{Duration, Instant};

/// Frames between performance log lines
pub const REPORT_INTERVAL: u64 = 60;
/// Weight of the newest sample in the moving average
const EMA_WEIGHT: f64 = 0.1;

/// Monotonic millisecond clock plus per-frame delta
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Milliseconds since the clock started
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Call once at the top of each frame. Returns (now_ms, dt seconds).
    pub fn tick(&mut self) -> (u64, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        ((now - self.start).as_millis() as u64, dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds spent in each phase of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimes {
    pub input_ms: f64,
    pub physics_ms: f64,
    pub render_ms: f64,
    pub frame_ms: f64,
}

/// Running frame statistics, logged every `REPORT_INTERVAL` frames
#[derive(Debug, Default)]
pub struct PerfStats {
    frames: u64,
    avg_frame_ms: f64,
    last: PhaseTimes,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one frame. Returns true when a report is due.
    pub fn record(&mut self, phases: PhaseTimes) -> bool {
        self.avg_frame_ms = if self.frames == 0 {
            phases.frame_ms
        } else {
            self.avg_frame_ms * (1.0 - EMA_WEIGHT) + phases.frame_ms * EMA_WEIGHT
        };
        self.last = phases;
        self.frames += 1;
        self.frames % REPORT_INTERVAL == 0
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn avg_frame_ms(&self) -> f64 {
        self.avg_frame_ms
    }

    pub fn fps(&self) -> f64 {
        if self.avg_frame_ms > 0.0 {
            1000.0 / self.avg_frame_ms
        } else {
            0.0
        }
    }

    pub fn report(&self) {
        tracing::info!(
            frame = self.frames,
            avg_ms = format_args!("{:.2}", self.avg_frame_ms),
            physics_ms = format_args!("{:.2}", self.last.physics_ms),
            render_ms = format_args!("{:.2}", self.last.render_ms),
            input_ms = format_args!("{:.2}", self.last.input_ms),
            fps = format_args!("{:.1}", self.fps()),
            "Performance"
        );
    }
}

/// Time left in the frame budget, if any
pub fn pacing_delay(elapsed: Duration, budget_ms: f64) -> Option<Duration> {
    let budget = Duration::from_secs_f64(budget_ms.max(0.0) / 1000.0);
    budget.checked_sub(elapsed).filter(|d| !d.is_zero())
}

/// Milliseconds elapsed since `since`
#[inline]
pub fn ms_since(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
