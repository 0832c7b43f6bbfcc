use std::time::{Duration, Instant};

pub const DEFAULT_TARGET_HZ: u32 = 60;
pub const DEFAULT_MAX_DT: f64 = 0.1;

/// Wall-clock frame timer for variable-step loops.
///
/// Each `tick` returns the seconds elapsed since the previous one, clamped to
/// `max_dt` so a stall (window drag, debugger pause, slow camera read) can't
/// feed one enormous step into the physics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_dt: f64,
    target_hz: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_HZ, DEFAULT_MAX_DT)
    }
}

impl FrameClock {
    pub fn new(target_hz: u32, max_dt: f64) -> Self {
        Self {
            last: Instant::now(),
            max_dt: max_dt.max(0.0),
            target_hz: target_hz.max(1),
        }
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }

    pub fn target_hz(&self) -> u32 {
        self.target_hz
    }

    pub fn target_frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_hz as f64)
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let raw = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        let dt = self.clamp(raw);
        if dt < raw {
            log::debug!("frame stalled for {raw:.3}s, clamped to {dt:.3}s");
        }
        dt
    }

    /// Clamps an externally measured delta the same way `tick` does.
    pub fn clamp(&self, dt: f64) -> f64 {
        if !dt.is_finite() || dt < 0.0 {
            return 0.0;
        }
        dt.min(self.max_dt)
    }

    /// Time left in the current frame budget, for loops that sleep to `target_hz`.
    pub fn remaining_in_frame(&self) -> Duration {
        self.target_frame_time().saturating_sub(self.last.elapsed())
    }
}
