//! House Energy - walk around a house, flip appliances, watch the meter
//!
//! Core modules:
//! - `sim`: Headless simulation (movement, collision, energy, challenge mode)
//! - `layout`: Session bootstrap (house geometry and device list)
//! - `settings`: Tunable gameplay settings
//! - `ui`: HUD formatting helpers
//! - `gesture`: Rate limiting for the webcam gesture command

pub mod error;
pub mod gesture;
pub mod layout;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::{Result, SimError};
pub use layout::HouseLayout;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default canvas size (pixels)
    pub const CANVAS_WIDTH: f32 = 900.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Gap kept between the player circle and the canvas edge
    pub const WALL_MARGIN: f32 = 2.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 14.0;
    pub const PLAYER_SPEED: f32 = 160.0; // px/s
    pub const PLAYER_SPAWN: (f32, f32) = (220.0, 160.0);

    /// Distance from a device centre within which `E` toggles it
    pub const ACTIVATION_RADIUS: f32 = 80.0;

    /// Upper bound on a single frame's dt (tab suspension, slow frames)
    pub const MAX_FRAME_DT: f32 = 0.2;

    /// Walking animation phase rate (radians per second of movement)
    pub const STEP_RATE: f32 = 12.0;

    /// Seconds per hour, for W·s -> Wh
    pub const SECS_PER_HOUR: f64 = 3600.0;

    /// Challenge defaults
    pub const CHALLENGE_DURATION_SECS: f32 = 120.0;
    pub const CHALLENGE_THRESHOLD_W: f32 = 1500.0;

    /// Randomizer timing: base interval plus up to `CHAOS_JITTER_MS`
    pub const CHAOS_BASE_INTERVAL_MS: u32 = 1200;
    pub const CHAOS_JITTER_MS: u32 = 800;
    /// Chance a randomizer firing forces its device on (otherwise toggles)
    pub const CHAOS_FORCE_ON_CHANCE: f64 = 0.75;

    /// HUD: consumption above this is flagged as too high
    pub const HIGH_LOAD_W: f32 = 800.0;
    /// HUD: wattage at which the meter bar is full
    pub const METER_FULL_SCALE_W: f32 = 2000.0;

    /// Minimum time between accepted gesture commands
    pub const GESTURE_COOLDOWN_MS: f64 = 2000.0;
}

/// Centre of an axis-aligned rectangle given its top-left corner and size
#[inline]
pub fn rect_center(min: Vec2, size: Vec2) -> Vec2 {
    min + size * 0.5
}

/// Clamp each component of `v` into `[min, max]`, tolerating `min > max`
/// (degenerate ranges collapse to their midpoint)
#[inline]
pub fn clamp_vec(v: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    let clamp_axis = |x: f32, lo: f32, hi: f32| {
        if lo > hi { (lo + hi) * 0.5 } else { x.clamp(lo, hi) }
    };
    Vec2::new(clamp_axis(v.x, min.x, max.x), clamp_axis(v.y, min.y, max.y))
}
