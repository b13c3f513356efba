//! Energy accounting
//!
//! Integrates the instantaneous draw of the registry into watt-hours.
//! Call `tick` exactly once per frame or energy is double counted.

use serde::{Deserialize, Serialize};

use super::device::{Device, total_watts};
use crate::consts::SECS_PER_HOUR;

/// Cumulative energy meter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyMeter {
    /// Energy used since the last reset (Wh)
    energy_wh: f64,
}

impl EnergyMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn energy_wh(&self) -> f64 {
        self.energy_wh
    }

    /// Accumulate `dt` seconds at the registry's current draw and return
    /// that draw in watts
    pub fn tick(&mut self, devices: &[Device], dt: f32) -> f32 {
        let watts = total_watts(devices);
        if dt > 0.0 && watts > 0.0 {
            self.energy_wh += f64::from(watts) * f64::from(dt) / SECS_PER_HOUR;
        }
        watts
    }

    pub fn reset(&mut self) {
        self.energy_wh = 0.0;
    }
}
