//! Simulation session state
//!
//! One `SimulationSession` owns everything a running house needs: the
//! device registry, the player, held keys, the energy meter and the
//! challenge machinery. Hosts mutate it through the methods here; the
//! per-frame pipeline lives in `tick`.

use glam::Vec2;
use serde::Serialize;

use super::challenge::{Challenge, ChallengeOutcome, ChallengePhase};
use super::chaos::{ChaosEvent, ChaosGenerator};
use super::device::{self, Device};
use super::energy::EnergyMeter;
use super::movement::{Bounds, InputState, Player};
use crate::error::Result;
use crate::layout::HouseLayout;
use crate::settings::Settings;

/// Something the host should react to after a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SimEvent {
    /// Challenge ended; show the result screen
    ChallengeFinished(ChallengeOutcome),
}

/// Outcome of a click/tap on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Device at this index was flipped
    Toggled(usize),
    /// Nothing under the pointer
    Missed,
    /// Clicking is disallowed while a challenge is active
    Locked,
}

/// Challenge fields the HUD needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChallengeStatus {
    pub phase: ChallengePhase,
    pub remaining_secs: f32,
    pub threshold_w: f32,
    pub input_locked: bool,
    pub outcome: Option<ChallengeOutcome>,
}

/// Read-only view handed to rendering/UI once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub player: Vec2,
    pub step_phase: f32,
    /// On/off per device, registry order
    pub device_on: Vec<bool>,
    pub total_watts: f32,
    pub energy_wh: f64,
    /// Nearest device within activation radius, if any
    pub near_device: Option<usize>,
    pub challenge: ChallengeStatus,
    pub running: bool,
}

/// A single house simulation
#[derive(Debug, Clone)]
pub struct SimulationSession {
    pub(crate) settings: Settings,
    pub(crate) canvas: Vec2,
    pub(crate) bounds: Bounds,
    pub(crate) devices: Vec<Device>,
    pub(crate) player: Player,
    pub(crate) input: InputState,
    pub(crate) energy: EnergyMeter,
    pub(crate) challenge: Challenge,
    pub(crate) chaos: ChaosGenerator,
    /// Frame driver keeps rescheduling while true
    pub(crate) running: bool,
    /// Draw measured on the most recent frame
    pub(crate) last_watts: f32,
}

impl SimulationSession {
    /// Build a session from a validated layout. `seed` drives the
    /// challenge randomizer.
    pub fn new(layout: HouseLayout, settings: Settings, seed: u64) -> Result<Self> {
        let settings = settings.sanitized();
        layout.validate(settings.wall_margin)?;

        let canvas = layout.canvas();
        let bounds = Bounds::inset(canvas, layout.player_radius, settings.wall_margin);
        let player = Player::new(layout.player_spawn, layout.player_radius, layout.player_speed);
        let chaos = ChaosGenerator::seeded(seed, settings.chaos_tuning());

        log::info!(
            "Session created: {} devices, canvas {}x{}, seed {}",
            layout.devices.len(),
            canvas.x,
            canvas.y,
            seed
        );

        Ok(Self {
            settings,
            canvas,
            bounds,
            devices: layout.devices,
            player,
            input: InputState::default(),
            energy: EnergyMeter::new(),
            challenge: Challenge::new(),
            chaos,
            running: false,
            last_watts: 0.0,
        })
    }

    // === Accessors ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn energy_wh(&self) -> f64 {
        self.energy.energy_wh()
    }

    /// Current draw of the registry (recomputed, not the last frame's)
    pub fn total_watts(&self) -> f32 {
        device::total_watts(&self.devices)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Randomizer run id; a host timer scheduled under an older id is stale
    pub fn chaos_generation(&self) -> u64 {
        self.chaos.generation()
    }

    pub fn chaos_active(&self) -> bool {
        self.chaos.is_running()
    }

    // === Run control ===

    pub fn start(&mut self) {
        if !self.running {
            log::info!("Simulation started");
        }
        self.running = true;
    }

    pub fn pause(&mut self) {
        if self.running {
            log::info!("Simulation paused");
        }
        self.running = false;
        self.input.clear();
    }

    // === Input ===

    /// Key down/up by `KeyboardEvent.key`. Returns true if it was a
    /// movement key.
    pub fn key_event(&mut self, key: &str, held: bool) -> bool {
        self.input.set_key(key, held)
    }

    /// `E`: toggle every device within the activation radius of the
    /// player. Not gated by the challenge lock.
    pub fn toggle_nearby(&mut self) -> usize {
        let toggled = device::toggle_within(
            &mut self.devices,
            self.player.pos,
            self.settings.activation_radius,
        );
        if toggled > 0 {
            log::debug!("Proximity toggle flipped {} device(s)", toggled);
        }
        toggled
    }

    /// Click/tap at a canvas point
    pub fn click_at(&mut self, point: Vec2) -> ClickOutcome {
        if self.challenge.is_input_locked() {
            log::warn!("Click ignored: input locked during challenge");
            return ClickOutcome::Locked;
        }
        match device::device_at(&self.devices, point) {
            Some(idx) => {
                self.devices[idx].toggle();
                ClickOutcome::Toggled(idx)
            }
            None => ClickOutcome::Missed,
        }
    }

    /// Gesture command: turn every device off. True if anything changed.
    pub fn force_all_off(&mut self) -> bool {
        let changed = device::switch_off_where(&mut self.devices, |_| true);
        if changed {
            log::info!("All devices switched off");
        }
        changed
    }

    /// Turn off lamps only. True if anything changed.
    pub fn turn_off_lights(&mut self) -> bool {
        device::switch_off_where(&mut self.devices, |d| d.kind.is_light())
    }

    /// Everything off and the meter back to zero
    pub fn reset(&mut self) {
        for device in &mut self.devices {
            device.on = false;
        }
        self.energy.reset();
        self.challenge.rebase_energy(self.energy.energy_wh());
        self.last_watts = 0.0;
        log::info!("Devices and energy reset");
    }

    // === Challenge ===

    /// Arm a challenge; stops any previous one. False if the duration or
    /// threshold was refused (the challenge is then Idle).
    pub fn start_challenge(&mut self, duration_secs: f32, threshold_w: f32) -> bool {
        self.chaos.stop();
        self.challenge
            .start(duration_secs, threshold_w, self.energy.energy_wh())
    }

    /// Arm a challenge with the configured duration and threshold
    pub fn start_default_challenge(&mut self) -> bool {
        let (duration, threshold) = (
            self.settings.challenge_duration_secs,
            self.settings.challenge_threshold_w,
        );
        self.start_challenge(duration, threshold)
    }

    /// Player dismissed the prompt: start the countdown and randomizer
    pub fn begin_challenge(&mut self) -> bool {
        if !self.challenge.begin() {
            return false;
        }
        self.chaos.start();
        true
    }

    pub fn stop_challenge(&mut self) {
        self.challenge.stop();
        self.chaos.stop();
    }

    /// Try again with the same duration and threshold: reset the house
    /// and go straight to Running
    pub fn restart_challenge(&mut self) {
        let (duration, threshold) = (self.challenge.duration_secs(), self.challenge.threshold_w());
        self.stop_challenge();
        self.reset();
        self.start_challenge(duration, threshold);
        self.begin_challenge();
        self.start();
    }

    /// Randomizer timer expired
    pub fn chaos_fire(&mut self, generation: u64) -> Option<ChaosEvent> {
        if !self.challenge.is_started() {
            return None;
        }
        self.chaos.fire_if_current(generation, &mut self.devices)
    }

    /// Delay before the next randomizer firing (fresh jitter each call)
    pub fn next_chaos_delay_ms(&mut self) -> u32 {
        self.chaos.next_delay_ms()
    }

    // === Snapshot ===

    pub fn snapshot(&self) -> Snapshot {
        let near_device = device::nearest(&self.devices, self.player.pos)
            .filter(|&(_, dist)| dist <= self.settings.activation_radius)
            .map(|(idx, _)| idx);

        Snapshot {
            player: self.player.pos,
            step_phase: self.player.step_phase,
            device_on: self.devices.iter().map(|d| d.on).collect(),
            total_watts: self.last_watts,
            energy_wh: self.energy.energy_wh(),
            near_device,
            challenge: ChallengeStatus {
                phase: self.challenge.phase(),
                remaining_secs: self.challenge.remaining_secs(),
                threshold_w: self.challenge.threshold_w(),
                input_locked: self.challenge.is_input_locked(),
                outcome: self.challenge.outcome(),
            },
            running: self.running,
        }
    }
}
