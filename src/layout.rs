//! House layout (session bootstrap)
//!
//! The fixed device list, canvas size and player spawn for a session.
//! Validated once before a session is built; the simulation never
//! re-checks any of it.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::collision::circle_intersects_rect;
use crate::sim::device::{Device, DeviceKind};
use crate::sim::movement::Bounds;

/// Everything needed to set up a house
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseLayout {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub devices: Vec<Device>,
    pub player_spawn: Vec2,
    pub player_radius: f32,
    pub player_speed: f32,
}

impl Default for HouseLayout {
    /// Living room, bedroom and a shared kitchen/pantry strip
    fn default() -> Self {
        use DeviceKind::*;
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            devices: vec![
                Device::new("light_liv", "Living Room Light", Light, 60.0, 140.0, 120.0, 48.0, 48.0),
                Device::new("light_bed", "Bedroom Light", Light, 60.0, 640.0, 120.0, 48.0, 48.0),
                Device::new("light_kitchen", "Kitchen Light", Light, 60.0, 320.0, 360.0, 48.0, 48.0),
                Device::new("fridge", "Fridge", Fridge, 120.0, 140.0, 360.0, 60.0, 70.0),
                Device::new("tv", "TV", Tv, 100.0, 420.0, 360.0, 80.0, 56.0),
                Device::new("heater", "Heater", Heater, 1000.0, 640.0, 360.0, 64.0, 76.0),
            ],
            player_spawn: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
        }
    }
}

impl HouseLayout {
    /// Parse and validate a layout from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: HouseLayout = serde_json::from_str(json)?;
        layout.validate(WALL_MARGIN)?;
        Ok(layout)
    }

    pub fn canvas(&self) -> Vec2 {
        Vec2::new(self.canvas_width, self.canvas_height)
    }

    /// Reject layouts the simulation cannot run
    pub fn validate(&self, wall_margin: f32) -> Result<()> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidCanvas { width, height });
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            let invalid = |reason: &str| SimError::InvalidDevice {
                id: device.id.clone(),
                reason: reason.to_string(),
            };
            if !device.power.is_finite() || device.power < 0.0 {
                return Err(invalid("power must be a finite, non-negative wattage"));
            }
            let geometry = [device.x, device.y, device.w, device.h];
            if geometry.iter().any(|v| !v.is_finite()) {
                return Err(invalid("geometry must be finite"));
            }
            if device.w <= 0.0 || device.h <= 0.0 {
                return Err(invalid("width and height must be positive"));
            }
            if !seen.insert(device.id.as_str()) {
                return Err(SimError::DuplicateDevice(device.id.clone()));
            }
        }

        if !(self.player_radius.is_finite() && self.player_radius > 0.0) {
            return Err(SimError::InvalidPlayer(format!(
                "radius must be positive, got {}",
                self.player_radius
            )));
        }
        if !(self.player_speed.is_finite() && self.player_speed >= 0.0) {
            return Err(SimError::InvalidPlayer(format!(
                "speed must be non-negative, got {}",
                self.player_speed
            )));
        }

        let spawn = self.player_spawn;
        let bounds = Bounds::inset(self.canvas(), self.player_radius, wall_margin);
        if !bounds.contains(spawn) {
            return Err(SimError::SpawnOutOfBounds {
                x: spawn.x,
                y: spawn.y,
            });
        }
        if let Some(device) = self
            .devices
            .iter()
            .find(|d| circle_intersects_rect(spawn, self.player_radius, &d.rect()))
        {
            return Err(SimError::SpawnBlocked(device.id.clone()));
        }

        Ok(())
    }
}
