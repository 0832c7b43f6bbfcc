//! Turns the raw per-tick gesture stream into discrete jump requests.

use serde::{Deserialize, Serialize};

use crate::config::TriggerConfig;
use crate::gesture::GestureSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Hand dropped below the jump line.
    Vertical,
    /// Hand moved rightward faster than the swipe threshold.
    Swipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpRequested {
    pub kind: TriggerKind,
    pub at: f64,
    /// Hand width at the moment of firing, for strength scaling.
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerState {
    /// `None` until the first gesture is accepted, so the cooldown can't
    /// swallow a gesture at session start.
    pub last_gesture_time: Option<f64>,
    pub vertical_armed: bool,
    pub prev_horizontal_center: Option<f64>,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            last_gesture_time: None,
            vertical_armed: true,
            prev_horizontal_center: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GestureTrigger {
    config: TriggerConfig,
    state: TriggerState,
}

impl GestureTrigger {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config: config.sanitized(),
            state: TriggerState::default(),
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TriggerConfig) {
        self.config = config.sanitized();
    }

    pub fn set_jump_threshold(&mut self, threshold: f64) {
        self.set_config(TriggerConfig {
            jump_threshold: threshold,
            ..self.config
        });
    }

    pub fn set_cooldown(&mut self, cooldown_sec: f64) {
        self.set_config(TriggerConfig {
            cooldown_sec,
            ..self.config
        });
    }

    pub fn set_swipe_threshold(&mut self, swipe_threshold: f64) {
        self.set_config(TriggerConfig {
            swipe_threshold,
            ..self.config
        });
    }

    pub fn set_hysteresis(&mut self, hysteresis: f64) {
        self.set_config(TriggerConfig {
            hysteresis,
            ..self.config
        });
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = TriggerState::default();
    }

    /// Drops the remembered hand center so the next sample can't read as a
    /// swipe. Cooldown and arming are untouched.
    pub fn forget_horizontal(&mut self) {
        self.state.prev_horizontal_center = None;
    }

    fn cooled_down(&self, now: f64) -> bool {
        match self.state.last_gesture_time {
            None => true,
            Some(last) => now - last > self.config.cooldown_sec,
        }
    }

    /// Runs both detectors on `sample` at session time `now`.
    ///
    /// At most one request comes back per call; the vertical detector wins a
    /// tie. Whether the player can actually jump right now is the caller's
    /// concern.
    pub fn evaluate(&mut self, sample: &GestureSample, now: f64) -> Option<JumpRequested> {
        let cfg = self.config;
        let mut fired = None;

        if sample.vertical_pos > cfg.jump_threshold + cfg.hysteresis {
            self.state.vertical_armed = true;
        }
        if sample.vertical_pos < cfg.jump_threshold
            && self.state.vertical_armed
            && self.cooled_down(now)
        {
            self.state.vertical_armed = false;
            self.state.last_gesture_time = Some(now);
            fired = Some(TriggerKind::Vertical);
        }

        let prev = self.state.prev_horizontal_center.replace(sample.horizontal_center);
        if fired.is_none() {
            if let Some(prev) = prev {
                let delta = sample.horizontal_center - prev;
                if delta > cfg.swipe_threshold && self.cooled_down(now) {
                    self.state.last_gesture_time = Some(now);
                    fired = Some(TriggerKind::Swipe);
                }
            }
        }

        fired.map(|kind| {
            log::debug!(
                "gesture {kind:?} fired at t={now:.3} (y={:.1}, x={:.1})",
                sample.vertical_pos,
                sample.horizontal_center
            );
            JumpRequested {
                kind,
                at: now,
                width: sample.width,
            }
        })
    }
}
