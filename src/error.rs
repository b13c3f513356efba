use thiserror::Error;

/// Errors raised while bootstrapping a session.
///
/// Nothing on the per-frame path returns these; they only surface when a
/// layout or settings blob is loaded and checked.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("Invalid device {id}: {reason}")]
    InvalidDevice { id: String, reason: String },

    #[error("Duplicate device id: {0}")]
    DuplicateDevice(String),

    #[error("Invalid player: {0}")]
    InvalidPlayer(String),

    #[error("Player spawn ({x}, {y}) is outside the playable area")]
    SpawnOutOfBounds { x: f32, y: f32 },

    #[error("Player spawn overlaps device {0}")]
    SpawnBlocked(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
