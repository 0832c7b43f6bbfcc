use engine::HeadlessRunner;
use serde::{Deserialize, Serialize};

use crate::session::{GameSession, SessionInput, SessionOutcome};

/// Presses "jump" on a fixed cadence whenever the player is standing still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autoplay {
    pub cadence_sec: f64,
    pub strength: f64,
    grounded_for: f64,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(0.6, 40.0)
    }
}

impl Autoplay {
    pub fn new(cadence_sec: f64, strength: f64) -> Self {
        Self {
            cadence_sec: cadence_sec.max(0.0),
            strength,
            grounded_for: 0.0,
        }
    }

    /// Picks the input for the next `dt` step of `session`.
    pub fn next_input(&mut self, session: &GameSession, dt: f64) -> SessionInput {
        if session.outcome().is_finished() || !session.controller().is_grounded() {
            self.grounded_for = 0.0;
            return SessionInput::Idle;
        }
        self.grounded_for += dt;
        if self.grounded_for >= self.cadence_sec {
            self.grounded_for = 0.0;
            return SessionInput::ManualJump(self.strength);
        }
        SessionInput::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: SessionOutcome,
    pub ticks: usize,
    /// Manual jumps issued by the autoplayer; gesture jumps aren't counted.
    pub jumps: u32,
    pub elapsed: f64,
    pub final_platform: i32,
}

/// Steps `runner` with a fixed `dt` until the session finishes or
/// `max_ticks` is reached.
pub fn run_autoplay(
    runner: &mut HeadlessRunner<GameSession>,
    autoplay: &mut Autoplay,
    dt: f64,
    max_ticks: usize,
) -> RunReport {
    let mut jumps = 0;
    let mut ticks = 0;
    while ticks < max_ticks && !runner.simulation().outcome().is_finished() {
        let input = autoplay.next_input(runner.simulation(), dt);
        if matches!(input, SessionInput::ManualJump(_)) {
            jumps += 1;
        }
        runner.step(input, dt);
        ticks += 1;
    }

    let session = runner.simulation();
    RunReport {
        outcome: session.outcome(),
        ticks,
        jumps,
        elapsed: session.time(),
        final_platform: session.player().current_platform_index,
    }
}
