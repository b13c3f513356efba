//! HUD text and meter helpers
//!
//! Pure formatting so the DOM layer only has to copy strings around.

use crate::settings::Settings;
use crate::sim::{ChallengeOutcome, ChallengePhase, ChallengeStatus};

/// How worrying the current draw is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionLevel {
    Normal,
    High,
}

impl ConsumptionLevel {
    pub fn from_watts(watts: f32, settings: &Settings) -> Self {
        if watts > settings.high_load_w {
            ConsumptionLevel::High
        } else {
            ConsumptionLevel::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionLevel::Normal => "Consumption under control",
            ConsumptionLevel::High => "Consumption too high",
        }
    }
}

/// Meter bar fill in [0, 1]
pub fn meter_fraction(watts: f32, settings: &Settings) -> f32 {
    (watts / settings.meter_full_scale_w).clamp(0.0, 1.0)
}

/// Countdown as `mm:ss`, rounding partial seconds down
pub fn format_countdown(secs: f32) -> String {
    let total = secs.max(0.0).floor() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Energy figure as shown on the HUD (two decimals)
pub fn format_energy(wh: f64) -> String {
    format!("{:.2}", wh)
}

/// One-line challenge status
pub fn challenge_status_text(status: &ChallengeStatus) -> &'static str {
    match status.phase {
        ChallengePhase::Idle => "",
        ChallengePhase::Armed => "Starting - confirm to begin",
        ChallengePhase::Running => "In progress",
        ChallengePhase::Won => "Won - time is up",
        ChallengePhase::Lost => "Lost - consumption too high",
    }
}

/// Title and message for the end-of-challenge dialog
pub fn result_text(outcome: &ChallengeOutcome) -> (&'static str, String) {
    match outcome {
        ChallengeOutcome::Won { energy_used_wh } => (
            "You won!",
            format!(
                "You kept consumption acceptable. Energy used: {} Wh",
                format_energy(*energy_used_wh)
            ),
        ),
        ChallengeOutcome::Lost {
            energy_used_wh,
            watts,
        } => (
            "You lost",
            format!(
                "Consumption hit {:.0} W, over the limit. Energy used: {} Wh",
                watts,
                format_energy(*energy_used_wh)
            ),
        ),
    }
}
