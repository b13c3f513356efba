//! Gameplay settings
//!
//! Persisted in LocalStorage on the web. Every field has a default so
//! older or partial blobs still load.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::chaos::ChaosTuning;

/// Tunable gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Movement ===
    /// Gap between the player circle and the canvas edge
    pub wall_margin: f32,
    /// `E` toggles devices whose centre is within this distance
    pub activation_radius: f32,
    /// Largest dt a single frame may integrate (seconds)
    pub max_frame_dt: f32,
    /// Walk animation rate
    pub step_rate: f32,

    // === Challenge ===
    pub challenge_duration_secs: f32,
    pub challenge_threshold_w: f32,
    /// Randomizer base interval (ms)
    pub chaos_interval_ms: u32,
    /// Randomizer extra delay, uniform in [0, jitter) (ms)
    pub chaos_jitter_ms: u32,
    /// Chance a firing forces its device on rather than toggling it
    pub chaos_force_on_chance: f64,

    // === HUD ===
    /// Consumption above this is shown as too high
    pub high_load_w: f32,
    /// Wattage at which the meter bar is full
    pub meter_full_scale_w: f32,

    // === Gesture ===
    pub gesture_cooldown_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wall_margin: WALL_MARGIN,
            activation_radius: ACTIVATION_RADIUS,
            max_frame_dt: MAX_FRAME_DT,
            step_rate: STEP_RATE,

            challenge_duration_secs: CHALLENGE_DURATION_SECS,
            challenge_threshold_w: CHALLENGE_THRESHOLD_W,
            chaos_interval_ms: CHAOS_BASE_INTERVAL_MS,
            chaos_jitter_ms: CHAOS_JITTER_MS,
            chaos_force_on_chance: CHAOS_FORCE_ON_CHANCE,

            high_load_w: HIGH_LOAD_W,
            meter_full_scale_w: METER_FULL_SCALE_W,

            gesture_cooldown_ms: GESTURE_COOLDOWN_MS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f32, d: f32| if v.is_finite() { v } else { d };

        self.wall_margin = finite_or(self.wall_margin, defaults.wall_margin).max(0.0);
        self.activation_radius = finite_or(self.activation_radius, defaults.activation_radius).max(0.0);
        self.max_frame_dt = finite_or(self.max_frame_dt, defaults.max_frame_dt).max(0.0);
        self.step_rate = finite_or(self.step_rate, defaults.step_rate).max(0.0);
        self.challenge_duration_secs =
            finite_or(self.challenge_duration_secs, defaults.challenge_duration_secs).max(0.0);
        if !(self.challenge_threshold_w.is_finite() && self.challenge_threshold_w > 0.0) {
            self.challenge_threshold_w = defaults.challenge_threshold_w;
        }
        self.chaos_force_on_chance = if self.chaos_force_on_chance.is_finite() {
            self.chaos_force_on_chance.clamp(0.0, 1.0)
        } else {
            defaults.chaos_force_on_chance
        };
        if !(self.meter_full_scale_w.is_finite() && self.meter_full_scale_w > 0.0) {
            self.meter_full_scale_w = defaults.meter_full_scale_w;
        }
        self.high_load_w = finite_or(self.high_load_w, defaults.high_load_w);
        if !self.gesture_cooldown_ms.is_finite() || self.gesture_cooldown_ms < 0.0 {
            self.gesture_cooldown_ms = defaults.gesture_cooldown_ms;
        }
        self
    }

    /// Randomizer tuning derived from these settings
    pub fn chaos_tuning(&self) -> ChaosTuning {
        ChaosTuning {
            base_interval_ms: self.chaos_interval_ms,
            jitter_ms: self.chaos_jitter_ms,
            force_on_chance: self.chaos_force_on_chance,
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "house_energy_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
