use thiserror::Error;

/// errors surfaced at the crate's edges (shape construction, settings, presets, rendering).
/// the matching engine itself never fails: degenerate geometry is skipped, not reported.
#[derive(Debug, Error)]
pub enum GrowError {
    #[error("a polygon needs at least 3 points, got {got}")]
    TooFewPoints { got: usize },

    #[error("polygon point {index} is not finite")]
    NonFinitePoint { index: usize },

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("render: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GrowError>;
