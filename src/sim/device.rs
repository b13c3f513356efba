//! Device registry
//!
//! Appliances are created once from the house layout and never added or
//! removed. Only their `on` flag changes during a session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;

/// Appliance category (drives sprite choice on the host side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Light2,
    Fridge,
    Tv,
    Heater,
    Microwave,
    #[default]
    #[serde(other)]
    Other,
}

impl DeviceKind {
    /// Ceiling and table lamps
    pub fn is_light(&self) -> bool {
        matches!(self, DeviceKind::Light | DeviceKind::Light2)
    }
}

/// A household appliance with a fixed body and a power draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: DeviceKind,
    /// Draw when on (watts)
    pub power: f32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub on: bool,
}

impl Device {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: DeviceKind,
        power: f32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            power,
            x,
            y,
            w,
            h,
            on: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Current draw (0 when off)
    #[inline]
    pub fn draw_watts(&self) -> f32 {
        if self.on { self.power } else { 0.0 }
    }

    pub fn toggle(&mut self) {
        self.on = !self.on;
    }
}

/// Sum of the draw of every device that is on
pub fn total_watts(devices: &[Device]) -> f32 {
    devices.iter().map(Device::draw_watts).sum()
}

/// Toggle every device whose centre lies within `radius` of `center`.
/// Returns how many were flipped.
pub fn toggle_within(devices: &mut [Device], center: Vec2, radius: f32) -> usize {
    let mut toggled = 0;
    for device in devices.iter_mut() {
        if device.center().distance(center) <= radius {
            device.toggle();
            toggled += 1;
        }
    }
    toggled
}

/// Index of the first device whose body contains `point`
pub fn device_at(devices: &[Device], point: Vec2) -> Option<usize> {
    devices.iter().position(|d| d.rect().contains(point))
}

/// Index and distance of the device centre closest to `point`
pub fn nearest(devices: &[Device], point: Vec2) -> Option<(usize, f32)> {
    devices
        .iter()
        .enumerate()
        .map(|(i, d)| (i, d.center().distance(point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Turn off every device matching `filter`. Returns true if any was on.
pub fn switch_off_where(devices: &mut [Device], filter: impl Fn(&Device) -> bool) -> bool {
    let mut changed = false;
    for device in devices.iter_mut().filter(|d| d.on && filter(d)) {
        device.on = false;
        changed = true;
    }
    changed
}
