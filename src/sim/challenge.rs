//! Timed wattage challenge
//!
//! `Idle -> Armed -> Running -> {Won, Lost}`; `stop()` returns to `Idle`
//! from anywhere. Armed waits for the player to dismiss the intro prompt
//! so the countdown and the randomizer cannot start behind their back.

use serde::{Deserialize, Serialize};

/// Where the challenge currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChallengePhase {
    #[default]
    Idle,
    /// Countdown shown but frozen until `begin()`
    Armed,
    /// Countdown ticking, randomizer firing
    Running,
    /// Timer ran out under the threshold
    Won,
    /// Draw exceeded the threshold
    Lost,
}

/// Final result handed to the UI when a challenge ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChallengeOutcome {
    Won { energy_used_wh: f64 },
    Lost { energy_used_wh: f64, watts: f32 },
}

impl ChallengeOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, ChallengeOutcome::Won { .. })
    }

    pub fn energy_used_wh(&self) -> f64 {
        match *self {
            ChallengeOutcome::Won { energy_used_wh }
            | ChallengeOutcome::Lost { energy_used_wh, .. } => energy_used_wh,
        }
    }
}

/// Challenge state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Challenge {
    phase: ChallengePhase,
    duration_secs: f32,
    remaining_secs: f32,
    threshold_w: f32,
    energy_at_start_wh: f64,
    outcome: Option<ChallengeOutcome>,
}

impl Challenge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    /// Armed or Running
    pub fn is_active(&self) -> bool {
        matches!(self.phase, ChallengePhase::Armed | ChallengePhase::Running)
    }

    /// Countdown has been acknowledged and is ticking
    pub fn is_started(&self) -> bool {
        self.phase == ChallengePhase::Running
    }

    /// Click-to-toggle is disallowed while a challenge is active
    pub fn is_input_locked(&self) -> bool {
        self.is_active()
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    pub fn threshold_w(&self) -> f32 {
        self.threshold_w
    }

    pub fn energy_at_start_wh(&self) -> f64 {
        self.energy_at_start_wh
    }

    /// Outcome of the last finished challenge, until the next stop/start
    pub fn outcome(&self) -> Option<ChallengeOutcome> {
        self.outcome
    }

    /// Arm a new challenge. Any previous one is stopped first.
    ///
    /// The threshold must be finite and positive and the duration finite;
    /// otherwise the call is refused and the machine stays Idle.
    pub fn start(&mut self, duration_secs: f32, threshold_w: f32, energy_wh: f64) -> bool {
        self.stop();
        if !(threshold_w.is_finite() && threshold_w > 0.0) || !duration_secs.is_finite() {
            log::warn!(
                "Challenge refused: duration {}s, threshold {}W",
                duration_secs,
                threshold_w
            );
            return false;
        }
        let duration_secs = duration_secs.max(0.0);
        self.phase = ChallengePhase::Armed;
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.threshold_w = threshold_w;
        self.energy_at_start_wh = energy_wh;
        log::info!(
            "Challenge armed: {:.0}s under {:.0}W",
            duration_secs,
            threshold_w
        );
        true
    }

    /// The energy meter was zeroed (or otherwise moved) under an active
    /// challenge: measure usage from `energy_wh` from now on
    pub fn rebase_energy(&mut self, energy_wh: f64) {
        if self.is_active() {
            self.energy_at_start_wh = energy_wh;
        }
    }

    /// Player acknowledged the prompt. Returns true if this started the
    /// countdown (only valid from Armed).
    pub fn begin(&mut self) -> bool {
        if self.phase != ChallengePhase::Armed {
            return false;
        }
        self.phase = ChallengePhase::Running;
        log::info!("Challenge running");
        true
    }

    /// Advance the countdown and check win/lose. Only acts while Running.
    pub fn evaluate(&mut self, dt: f32, total_w: f32, energy_wh: f64) -> Option<ChallengeOutcome> {
        if self.phase != ChallengePhase::Running {
            return None;
        }

        self.remaining_secs = (self.remaining_secs - dt.max(0.0)).clamp(0.0, self.duration_secs);
        let energy_used_wh = energy_wh - self.energy_at_start_wh;

        let outcome = if total_w > self.threshold_w {
            self.phase = ChallengePhase::Lost;
            ChallengeOutcome::Lost {
                energy_used_wh,
                watts: total_w,
            }
        } else if self.remaining_secs <= 0.0 {
            self.phase = ChallengePhase::Won;
            ChallengeOutcome::Won { energy_used_wh }
        } else {
            return None;
        };

        log::info!(
            "Challenge {}: {:.2} Wh used",
            if outcome.is_win() { "won" } else { "lost" },
            energy_used_wh
        );
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Force back to Idle from any phase
    pub fn stop(&mut self) {
        if self.phase != ChallengePhase::Idle {
            log::debug!("Challenge stopped from {:?}", self.phase);
        }
        self.phase = ChallengePhase::Idle;
        self.remaining_secs = 0.0;
        self.outcome = None;
    }
}
