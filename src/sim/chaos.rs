//! Challenge randomizer
//!
//! While a challenge is running, a recurring timer picks a device at
//! random and mostly switches it on. The generator only decides *what*
//! happens and *when next*; the host owns the actual timer and calls
//! `fire` when it expires.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::device::Device;
use crate::consts::*;

/// What a single randomizer firing did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChaosEvent {
    /// Index into the device registry
    pub device: usize,
    /// True if the device was forced on, false if it was toggled
    pub forced_on: bool,
    /// Device state after the firing
    pub now_on: bool,
}

/// Timing and odds for the randomizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosTuning {
    pub base_interval_ms: u32,
    pub jitter_ms: u32,
    pub force_on_chance: f64,
}

impl Default for ChaosTuning {
    fn default() -> Self {
        Self {
            base_interval_ms: CHAOS_BASE_INTERVAL_MS,
            jitter_ms: CHAOS_JITTER_MS,
            force_on_chance: CHAOS_FORCE_ON_CHANCE,
        }
    }
}

impl ChaosTuning {
    /// Force-on probability usable by `random_bool`: clamped to [0, 1],
    /// non-finite values fall back to the default
    pub fn force_on_probability(&self) -> f64 {
        if self.force_on_chance.is_finite() {
            self.force_on_chance.clamp(0.0, 1.0)
        } else {
            CHAOS_FORCE_ON_CHANCE
        }
    }
}

/// Random device activator with an injectable RNG
#[derive(Debug, Clone)]
pub struct ChaosGenerator<R = Pcg32> {
    rng: R,
    tuning: ChaosTuning,
    running: bool,
    /// Bumped on every start/stop so a stale host timer can be detected
    generation: u64,
}

impl ChaosGenerator<Pcg32> {
    /// Seeded PCG generator (reproducible runs)
    pub fn seeded(seed: u64, tuning: ChaosTuning) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), tuning)
    }
}

impl<R: Rng> ChaosGenerator<R> {
    pub fn with_rng(rng: R, tuning: ChaosTuning) -> Self {
        Self {
            rng,
            tuning,
            running: false,
            generation: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Identifies the current run; timers scheduled under an older
    /// generation must not fire
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start(&mut self) {
        self.running = true;
        self.generation += 1;
        log::debug!("Randomizer started (generation {})", self.generation);
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Randomizer stopped (generation {})", self.generation);
        }
        self.running = false;
        self.generation += 1;
    }

    /// Delay until the next firing: base interval plus fresh jitter
    pub fn next_delay_ms(&mut self) -> u32 {
        let jitter = if self.tuning.jitter_ms == 0 {
            0
        } else {
            self.rng.random_range(0..self.tuning.jitter_ms)
        };
        self.tuning.base_interval_ms + jitter
    }

    /// Pick one device uniformly and force it on (or toggle it).
    /// Does nothing when stopped or when the registry is empty.
    pub fn fire(&mut self, devices: &mut [Device]) -> Option<ChaosEvent> {
        if !self.running || devices.is_empty() {
            return None;
        }

        let idx = self.rng.random_range(0..devices.len());
        let forced_on = self.rng.random_bool(self.tuning.force_on_probability());
        let device = &mut devices[idx];
        if forced_on {
            device.on = true;
        } else {
            device.toggle();
        }

        log::debug!(
            "Randomizer hit {} ({}), now {}",
            device.id,
            if forced_on { "forced" } else { "toggled" },
            if device.on { "on" } else { "off" }
        );

        Some(ChaosEvent {
            device: idx,
            forced_on,
            now_on: device.on,
        })
    }

    /// Fire only if `generation` still matches the current run
    pub fn fire_if_current(&mut self, generation: u64, devices: &mut [Device]) -> Option<ChaosEvent> {
        if generation != self.generation {
            return None;
        }
        self.fire(devices)
    }
}
