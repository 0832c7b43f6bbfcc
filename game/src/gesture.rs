//! Gesture sources: where the per-tick hand sample comes from.
//!
//! The session pulls one [`GestureSample`] per tick through the
//! [`GestureSource`] trait and never cares whether it came from a camera
//! detector or the built-in sawtooth simulator.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScreenConfig;

/// Seconds for one full low-to-high sweep of the simulated hand.
pub const SIM_PERIOD_SEC: f64 = 4.0;
pub const SIM_LOW_Y: f64 = 500.0;
pub const SIM_HIGH_Y: f64 = 50.0;
/// Detections under this confidence are treated as "no hand this tick".
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// One normalized hand reading in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    pub vertical_pos: f64,
    pub horizontal_center: f64,
    pub width: f64,
    pub confidence: f64,
    pub timestamp: f64,
}

impl GestureSample {
    /// The reading used before any hand has been seen: hand at the bottom of
    /// the screen, centered, so it can neither cross the jump line nor swipe.
    pub fn neutral(screen: &ScreenConfig, timestamp: f64) -> Self {
        Self {
            vertical_pos: screen.height,
            horizontal_center: screen.center_x(),
            width: 0.0,
            confidence: 0.0,
            timestamp,
        }
    }
}

pub trait GestureSource {
    /// Produces this tick's sample, or `None` when nothing was detected.
    /// `now` is session time in seconds.
    fn produce_sample(&mut self, now: f64) -> Option<GestureSample>;

    /// Short label for HUD/debug output.
    fn name(&self) -> &'static str;

    /// True once a hardware-backed source has given up and fallen back to
    /// simulation.
    fn is_degraded(&self) -> bool {
        false
    }
}

/// Deterministic sawtooth hand: sweeps from [`SIM_LOW_Y`] up to
/// [`SIM_HIGH_Y`] every [`SIM_PERIOD_SEC`] while the width breathes 5..25.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedGesture {
    center_x: f64,
}

impl SimulatedGesture {
    pub fn new(screen: &ScreenConfig) -> Self {
        Self {
            center_x: screen.center_x(),
        }
    }

    pub fn sample_at(&self, t: f64) -> GestureSample {
        let cycle = t.rem_euclid(SIM_PERIOD_SEC) / SIM_PERIOD_SEC;
        GestureSample {
            vertical_pos: SIM_LOW_Y - cycle * (SIM_LOW_Y - SIM_HIGH_Y),
            horizontal_center: self.center_x,
            width: 5.0 + ((t * 3.0).sin() + 1.0) * 10.0,
            confidence: 1.0,
            timestamp: t,
        }
    }
}

impl GestureSource for SimulatedGesture {
    fn produce_sample(&mut self, now: f64) -> Option<GestureSample> {
        Some(self.sample_at(now))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("hand detector unavailable")]
    Unavailable,
    #[error("hand detector timed out")]
    Timeout,
    #[error("hand detector backend failed: {0}")]
    Backend(String),
}

/// Bounding box of a detected hand in normalized image coordinates (0..1,
/// already mirrored so moving the hand right increases `x`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub confidence: f64,
}

impl HandDetection {
    pub fn to_sample(&self, screen: &ScreenConfig, timestamp: f64) -> GestureSample {
        GestureSample {
            vertical_pos: (self.y_min + self.y_max) / 2.0 * screen.height,
            horizontal_center: (self.x_min + self.x_max) / 2.0 * screen.width,
            width: (self.x_max - self.x_min).abs() * screen.width,
            confidence: self.confidence,
            timestamp,
        }
    }
}

/// A camera or tracker backend. Implementations must bound their own wait
/// (returning [`DetectorError::Timeout`]) so a tick never blocks indefinitely.
pub trait HandDetector {
    fn detect(&mut self) -> Result<Option<HandDetection>, DetectorError>;
}

#[derive(Debug)]
enum Backend<D> {
    Live { detector: D, failures: u32 },
    Degraded(SimulatedGesture),
}

/// Detector-backed source that permanently falls back to simulation after
/// `max_consecutive_failures` errors in a row.
#[derive(Debug)]
pub struct ExternalGesture<D: HandDetector> {
    backend: Backend<D>,
    screen: ScreenConfig,
    min_confidence: f64,
    max_consecutive_failures: u32,
}

impl<D: HandDetector> ExternalGesture<D> {
    pub fn new(detector: D, screen: ScreenConfig) -> Self {
        Self {
            backend: Backend::Live {
                detector,
                failures: 0,
            },
            screen,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_consecutive_failures: 1,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_max_consecutive_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_failures = failures.max(1);
        self
    }

    pub fn detector(&self) -> Option<&D> {
        match &self.backend {
            Backend::Live { detector, .. } => Some(detector),
            Backend::Degraded(_) => None,
        }
    }
}

impl<D: HandDetector> GestureSource for ExternalGesture<D> {
    fn produce_sample(&mut self, now: f64) -> Option<GestureSample> {
        let (detector, failures) = match &mut self.backend {
            Backend::Degraded(sim) => return sim.produce_sample(now),
            Backend::Live { detector, failures } => (detector, failures),
        };

        match detector.detect() {
            Ok(detection) => {
                *failures = 0;
                detection
                    .filter(|d| d.confidence >= self.min_confidence)
                    .map(|d| d.to_sample(&self.screen, now))
            }
            Err(err) => {
                *failures += 1;
                if *failures < self.max_consecutive_failures {
                    log::debug!("hand detector error ({failures} in a row): {err}");
                    return None;
                }
                log::warn!(
                    "hand detector failed {failures} time(s) in a row ({err}); \
                     switching to simulated gestures for the rest of the session"
                );
                let mut sim = SimulatedGesture::new(&self.screen);
                let sample = sim.produce_sample(now);
                self.backend = Backend::Degraded(sim);
                sample
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.backend {
            Backend::Live { .. } => "external",
            Backend::Degraded(_) => "simulated (fallback)",
        }
    }

    fn is_degraded(&self) -> bool {
        matches!(self.backend, Backend::Degraded(_))
    }
}

/// Replays a fixed list of readings, one per tick, then reports nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGesture {
    frames: VecDeque<Option<GestureSample>>,
}

impl ScriptedGesture {
    pub fn new(frames: impl IntoIterator<Item = Option<GestureSample>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Builds a script from `(vertical_pos, horizontal_center)` pairs with a
    /// fixed width, timestamps filled in when played.
    pub fn from_positions(positions: impl IntoIterator<Item = (f64, f64)>, width: f64) -> Self {
        Self::new(positions.into_iter().map(|(vertical_pos, horizontal_center)| {
            Some(GestureSample {
                vertical_pos,
                horizontal_center,
                width,
                confidence: 1.0,
                timestamp: 0.0,
            })
        }))
    }

    pub fn push(&mut self, frame: Option<GestureSample>) {
        self.frames.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl GestureSource for ScriptedGesture {
    fn produce_sample(&mut self, now: f64) -> Option<GestureSample> {
        let mut sample = self.frames.pop_front().flatten()?;
        sample.timestamp = now;
        Some(sample)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
