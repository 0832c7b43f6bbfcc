use engine::Simulation;
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, JumpConfig, TriggerConfig};
use crate::gesture::{GestureSample, GestureSource, SimulatedGesture};
use crate::jump::{
    ControllerStatus, JumpController, JumpEvent, JumpRejection, PlayerModeKind, PlayerState,
};
use crate::platform::{PlatformField, Point};
use crate::trigger::{GestureTrigger, JumpRequested};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl SessionOutcome {
    pub fn is_finished(self) -> bool {
        matches!(self, SessionOutcome::Won | SessionOutcome::Lost)
    }
}

/// What happened during one [`GameSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub trigger: Option<JumpRequested>,
    pub jump_started: bool,
    pub event: Option<JumpEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub mode: PlayerModeKind,
    pub x: f64,
    pub y: f64,
    pub current_platform_index: i32,
    pub jump_progress: Option<f64>,
}

/// Everything a renderer or HUD needs after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: f64,
    pub outcome: SessionOutcome,
    pub player: PlayerSnapshot,
    pub platforms: Vec<Point>,
    pub gesture: GestureSample,
    pub gesture_source: String,
    pub last_jump_distance: f64,
    pub last_jump_strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    Idle,
    ManualJump(f64),
    Reset,
}

pub struct GameSession {
    config: GameConfig,
    field: PlatformField,
    source: Box<dyn GestureSource>,
    trigger: GestureTrigger,
    controller: JumpController,
    outcome: SessionOutcome,
    gesture: GestureSample,
}

impl GameSession {
    /// A session driven by the built-in simulated hand.
    pub fn new(config: GameConfig) -> Self {
        let source = SimulatedGesture::new(&config.screen);
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(config: GameConfig, source: Box<dyn GestureSource>) -> Self {
        let config = config.sanitized();
        let field = PlatformField::from_course(&config.course);
        let controller = JumpController::new(config.jump, config.screen.height, &field);
        Self {
            trigger: GestureTrigger::new(config.trigger),
            gesture: GestureSample::neutral(&config.screen, 0.0),
            outcome: SessionOutcome::NotStarted,
            source,
            field,
            controller,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn field(&self) -> &PlatformField {
        &self.field
    }

    pub fn controller(&self) -> &JumpController {
        &self.controller
    }

    pub fn trigger(&self) -> &GestureTrigger {
        &self.trigger
    }

    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    pub fn player(&self) -> &PlayerState {
        self.controller.player()
    }

    pub fn time(&self) -> f64 {
        self.field.elapsed()
    }

    pub fn platform_count(&self) -> usize {
        self.field.count()
    }

    /// Current position of stair `index`, `None` when out of range.
    pub fn platform_position(&self, index: i32) -> Option<Point> {
        self.field
            .contains(index)
            .then(|| self.field.position_of(index))
    }

    pub fn platform_positions(&self) -> Vec<Point> {
        self.field.positions()
    }

    pub fn last_jump_distance(&self) -> f64 {
        self.controller.last_jump_distance()
    }

    /// The sample the trigger saw on the last tick (latched when the source
    /// reported nothing).
    pub fn gesture_sample(&self) -> &GestureSample {
        &self.gesture
    }

    pub fn gesture_source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn gesture_source_degraded(&self) -> bool {
        self.source.is_degraded()
    }

    pub fn set_gesture_source(&mut self, source: Box<dyn GestureSource>) {
        log::info!("gesture source set to {}", source.name());
        self.source = source;
        self.trigger.forget_horizontal();
    }

    pub fn set_trigger_config(&mut self, trigger: TriggerConfig) {
        self.trigger.set_config(trigger);
        self.config.trigger = *self.trigger.config();
    }

    pub fn set_jump_threshold(&mut self, threshold: f64) {
        self.trigger.set_jump_threshold(threshold);
        self.config.trigger = *self.trigger.config();
    }

    pub fn set_cooldown(&mut self, cooldown_sec: f64) {
        self.trigger.set_cooldown(cooldown_sec);
        self.config.trigger = *self.trigger.config();
    }

    pub fn set_swipe_threshold(&mut self, swipe_threshold: f64) {
        self.trigger.set_swipe_threshold(swipe_threshold);
        self.config.trigger = *self.trigger.config();
    }

    pub fn set_hysteresis(&mut self, hysteresis: f64) {
        self.trigger.set_hysteresis(hysteresis);
        self.config.trigger = *self.trigger.config();
    }

    pub fn set_jump_config(&mut self, jump: JumpConfig) {
        self.controller.set_config(jump);
        self.config.jump = *self.controller.config();
    }

    fn start_if_needed(&mut self) {
        if self.outcome == SessionOutcome::NotStarted {
            self.outcome = SessionOutcome::InProgress;
            log::info!("session started");
        }
    }

    /// Jumps to the next stair without going through the gesture pipeline.
    pub fn manual_jump(&mut self, strength: f64) -> Result<(), JumpRejection> {
        let target = self.controller.player().current_platform_index + 1;
        self.controller.request_jump(target, strength, &self.field)?;
        self.start_if_needed();
        Ok(())
    }

    /// Advances the session by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.simulation.max_dt)
        } else {
            0.0
        };
        self.start_if_needed();
        let mut report = TickReport::default();

        self.field.advance_time(dt);
        self.controller.lock_to_support(&self.field);

        let now = self.field.elapsed();
        if let Some(sample) = self.source.produce_sample(now) {
            self.gesture = sample;
        }

        report.trigger = self.trigger.evaluate(&self.gesture, now);
        if let Some(request) = report.trigger {
            if self.controller.is_grounded() {
                let target = self.controller.player().current_platform_index + 1;
                let strength = request.width * self.config.jump.strength_per_width;
                report.jump_started = self
                    .controller
                    .request_jump(target, strength, &self.field)
                    .is_ok();
            }
        }

        report.event = self.controller.tick(dt, &self.field);
        let outcome = match self.controller.status() {
            ControllerStatus::Playing => self.outcome,
            ControllerStatus::Won => SessionOutcome::Won,
            ControllerStatus::Lost => SessionOutcome::Lost,
        };
        if outcome != self.outcome {
            log::info!("session {:?} at t={now:.2}", outcome);
            self.outcome = outcome;
        }
        report
    }

    /// Back to the start platform with a fresh clock, from any state.
    pub fn reset(&mut self) {
        self.field.reset_time();
        self.trigger.reset();
        self.controller.reset(&self.field);
        self.gesture = GestureSample::neutral(&self.config.screen, 0.0);
        self.outcome = SessionOutcome::NotStarted;
        log::info!("session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let player = self.controller.player();
        SessionSnapshot {
            time: self.field.elapsed(),
            outcome: self.outcome,
            player: PlayerSnapshot {
                mode: player.mode.kind(),
                x: player.x,
                y: player.y,
                current_platform_index: player.current_platform_index,
                jump_progress: self.controller.jump_progress(),
            },
            platforms: self.field.positions(),
            gesture: self.gesture,
            gesture_source: self.source.name().to_string(),
            last_jump_distance: self.controller.last_jump_distance(),
            last_jump_strength: self.controller.last_jump_strength(),
        }
    }
}

impl Simulation for GameSession {
    type Input = SessionInput;
    type Snapshot = SessionSnapshot;

    fn advance(&mut self, input: SessionInput, dt: f64) {
        match input {
            SessionInput::Idle => {}
            SessionInput::ManualJump(strength) => {
                let _ = self.manual_jump(strength);
            }
            SessionInput::Reset => self.reset(),
        }
        self.tick(dt);
    }

    fn snapshot(&self) -> SessionSnapshot {
        GameSession::snapshot(self)
    }
}
