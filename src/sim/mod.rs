//! Headless house simulation
//!
//! Everything that decides gameplay lives here. No DOM, no drawing:
//! - Single writer per frame (the frame driver), timers in between
//! - Seeded RNG only (the challenge randomizer)
//! - Registry order is stable; devices are never added or removed

pub mod challenge;
pub mod chaos;
pub mod collision;
pub mod device;
pub mod energy;
pub mod movement;
pub mod state;
pub mod tick;

pub use challenge::{Challenge, ChallengeOutcome, ChallengePhase};
pub use chaos::{ChaosEvent, ChaosGenerator, ChaosTuning};
pub use collision::{Rect, circle_intersects_rect, collides_with_any};
pub use device::{Device, DeviceKind, total_watts};
pub use energy::EnergyMeter;
pub use movement::{Bounds, InputState, MoveOutcome, Player, step_player};
pub use state::{ChallengeStatus, ClickOutcome, SimEvent, SimulationSession, Snapshot};
pub use tick::{FrameClock, FrameReport, clamp_dt, tick};
