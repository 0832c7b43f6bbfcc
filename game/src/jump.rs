//! Player jump state machine.
//!
//! `Grounded -> Jumping -> (Grounded | Falling)`, with `Won` entered straight
//! from a landing on the last stair and `Lost` from falling off the screen.
//! Both terminal states hold until [`JumpController::reset`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JumpConfig;
use crate::platform::{PlatformField, Point, START_PLATFORM};

/// Slack for accumulated `dt` that lands a hair short of the jump duration.
const PROGRESS_EPSILON: f64 = 1e-9;

/// Flight captured at take-off. The target is aimed at where the stair was
/// when the jump began and is not re-sampled until landing is judged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpArc {
    pub start: Point,
    pub target: Point,
    pub target_index: i32,
    pub start_time: f64,
    pub duration_sec: f64,
    pub strength: f64,
}

impl JumpArc {
    pub fn progress(&self, now: f64) -> f64 {
        let raw = (now - self.start_time) / self.duration_sec;
        if raw >= 1.0 - PROGRESS_EPSILON {
            1.0
        } else {
            raw.clamp(0.0, 1.0)
        }
    }

    pub fn position(&self, progress: f64) -> Point {
        let eased = ease_out_cubic(progress);
        Point::new(
            self.start.x + (self.target.x - self.start.x) * eased,
            self.start.y + (self.target.y - self.start.y) * eased,
        )
    }
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let inv = 1.0 - progress.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerMode {
    Grounded,
    Jumping(JumpArc),
    Falling { fall_velocity: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerModeKind {
    Grounded,
    Jumping,
    Falling,
}

impl PlayerMode {
    pub fn kind(&self) -> PlayerModeKind {
        match self {
            PlayerMode::Grounded => PlayerModeKind::Grounded,
            PlayerMode::Jumping(_) => PlayerModeKind::Jumping,
            PlayerMode::Falling { .. } => PlayerModeKind::Falling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub mode: PlayerMode,
    /// [`START_PLATFORM`] or the last stair landed on.
    pub current_platform_index: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JumpRejection {
    #[error("player is not grounded")]
    NotGrounded,
    #[error("session is over")]
    Finished,
    #[error("jump must target platform {expected}, got {requested}")]
    NotAdjacent { expected: i32, requested: i32 },
    #[error("platform {0} does not exist")]
    OutOfRange(i32),
}

/// What a controller tick resolved, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpEvent {
    Landed { index: i32 },
    Missed { index: i32 },
    Won,
    Lost,
}

#[derive(Debug, Clone)]
pub struct JumpController {
    config: JumpConfig,
    screen_height: f64,
    player: PlayerState,
    status: ControllerStatus,
    now: f64,
    last_jump_distance: f64,
    last_jump_strength: f64,
}

impl JumpController {
    pub fn new(config: JumpConfig, screen_height: f64, field: &PlatformField) -> Self {
        let config = config.sanitized();
        let start = field.start();
        Self {
            player: start_state(start, &config),
            config,
            screen_height,
            status: ControllerStatus::Playing,
            now: 0.0,
            last_jump_distance: 0.0,
            last_jump_strength: 0.0,
        }
    }

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: JumpConfig) {
        self.config = config.sanitized();
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_grounded(&self) -> bool {
        self.status == ControllerStatus::Playing && self.player.mode == PlayerMode::Grounded
    }

    pub fn last_jump_distance(&self) -> f64 {
        self.last_jump_distance
    }

    pub fn last_jump_strength(&self) -> f64 {
        self.last_jump_strength
    }

    /// Progress of the current jump in `0..=1`, if one is in flight.
    pub fn jump_progress(&self) -> Option<f64> {
        match self.player.mode {
            PlayerMode::Jumping(arc) => Some(arc.progress(self.now)),
            _ => None,
        }
    }

    /// Player center height when standing on `index`.
    fn support_y(&self, field: &PlatformField, index: i32) -> f64 {
        field.position_of(index).y - self.config.player_radius
    }

    /// Keeps a grounded player riding its stair as the stair oscillates.
    pub fn lock_to_support(&mut self, field: &PlatformField) {
        if !self.is_grounded() || !field.contains(self.player.current_platform_index) {
            return;
        }
        self.player.y = self.support_y(field, self.player.current_platform_index);
    }

    /// Starts a jump to `target_index`, which must be the next stair.
    ///
    /// A rejected request changes nothing; callers that feed gesture events
    /// straight in can ignore the result.
    pub fn request_jump(
        &mut self,
        target_index: i32,
        strength: f64,
        field: &PlatformField,
    ) -> Result<(), JumpRejection> {
        if self.status != ControllerStatus::Playing {
            return Err(JumpRejection::Finished);
        }
        if self.player.mode != PlayerMode::Grounded {
            return Err(JumpRejection::NotGrounded);
        }
        let expected = self.player.current_platform_index + 1;
        if target_index != expected {
            return Err(JumpRejection::NotAdjacent {
                expected,
                requested: target_index,
            });
        }
        if target_index < 0 || target_index as usize >= field.count() {
            return Err(JumpRejection::OutOfRange(target_index));
        }

        let start = Point::new(self.player.x, self.player.y);
        let target = Point::new(
            field.center_x(target_index),
            self.support_y(field, target_index),
        );
        let arc = JumpArc {
            start,
            target,
            target_index,
            start_time: self.now,
            duration_sec: self.config.duration_sec,
            strength,
        };
        self.player.mode = PlayerMode::Jumping(arc);
        self.last_jump_distance = target.x - start.x;
        self.last_jump_strength = strength;
        log::debug!(
            "jump {} -> {} from ({:.1}, {:.1}) aiming ({:.1}, {:.1})",
            self.player.current_platform_index,
            target_index,
            start.x,
            start.y,
            target.x,
            target.y
        );
        Ok(())
    }

    /// Advances in-flight animation or falling physics by `dt` seconds.
    pub fn tick(&mut self, dt: f64, field: &PlatformField) -> Option<JumpEvent> {
        self.now += dt;
        if self.status != ControllerStatus::Playing {
            return None;
        }

        match self.player.mode {
            PlayerMode::Grounded => None,
            PlayerMode::Jumping(arc) => {
                let progress = arc.progress(self.now);
                let pos = arc.position(progress);
                self.player.x = pos.x;
                self.player.y = pos.y;
                if progress < 1.0 {
                    return None;
                }
                Some(self.resolve_landing(&arc, field))
            }
            PlayerMode::Falling { fall_velocity } => {
                let fall_velocity = fall_velocity + self.config.gravity * dt;
                self.player.y += fall_velocity * dt;
                self.player.mode = PlayerMode::Falling { fall_velocity };
                if self.player.y > self.screen_height + self.config.fall_margin {
                    self.status = ControllerStatus::Lost;
                    log::info!(
                        "player fell off screen below platform {}",
                        self.player.current_platform_index
                    );
                    return Some(JumpEvent::Lost);
                }
                None
            }
        }
    }

    fn resolve_landing(&mut self, arc: &JumpArc, field: &PlatformField) -> JumpEvent {
        let index = arc.target_index;
        let lands = index >= 0 && (index as usize) < field.count() && {
            let center = field.center_x(index);
            let surface = self.support_y(field, index);
            let horizontal_ok = (self.player.x - center).abs() <= self.config.landing_tolerance;
            let vertical_ok = self
                .config
                .landing_vertical_tolerance
                .is_none_or(|tol| (self.player.y - surface).abs() <= tol);
            horizontal_ok && vertical_ok
        };

        if !lands {
            log::debug!(
                "missed platform {index} at ({:.1}, {:.1})",
                self.player.x,
                self.player.y
            );
            self.player.mode = PlayerMode::Falling { fall_velocity: 0.0 };
            return JumpEvent::Missed { index };
        }

        self.player.mode = PlayerMode::Grounded;
        self.player.current_platform_index = index;
        self.player.y = self.support_y(field, index);
        log::debug!("landed on platform {index}");

        if index as usize + 1 == field.count() {
            self.status = ControllerStatus::Won;
            log::info!("reached the last platform ({index})");
            return JumpEvent::Won;
        }
        JumpEvent::Landed { index }
    }

    /// Puts the player back on the start platform and clears every piece of
    /// in-flight state in one assignment.
    pub fn reset(&mut self, field: &PlatformField) {
        *self = Self {
            player: start_state(field.start(), &self.config),
            config: self.config,
            screen_height: self.screen_height,
            status: ControllerStatus::Playing,
            now: 0.0,
            last_jump_distance: 0.0,
            last_jump_strength: 0.0,
        };
    }
}

fn start_state(start: Point, config: &JumpConfig) -> PlayerState {
    PlayerState {
        mode: PlayerMode::Grounded,
        current_platform_index: START_PLATFORM,
        x: start.x,
        y: start.y - config.player_radius,
    }
}
