//! Circle-vs-rectangle collision
//!
//! The player is a circle, every device body is an axis-aligned box. The
//! test clamps the circle centre into the box to find the closest point,
//! then compares squared distance against the squared radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::device::Device;

/// Axis-aligned rectangle (top-left corner + size, canvas units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        crate::rect_center(self.min, self.size)
    }

    /// Closest point inside the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }

    /// Inclusive point containment (edges count as inside)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }
}

/// Does a circle at `center` with `radius` touch `rect`?
///
/// Touching (distance exactly equal to the radius) counts as a hit, so a
/// resolved position always keeps a strictly positive gap.
#[inline]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) <= radius * radius
}

/// Does a circle overlap any device body? Stops at the first hit.
pub fn collides_with_any(center: Vec2, radius: f32, devices: &[Device]) -> bool {
    devices
        .iter()
        .any(|d| circle_intersects_rect(center, radius, &d.rect()))
}
