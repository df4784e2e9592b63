// Construction-time errors. Stepping a built crowd cannot fail.

use thiserror::Error;

/// A `CrowdConfig` that cannot describe a working simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("direction resolution must be at least 1")]
    ZeroResolution,
    #[error("occupancy grid must have at least one cell per axis (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },
    #[error("max agents per cell must be at least 1")]
    ZeroCellCapacity,
    #[error("world size must be positive and finite (got {width}x{height})")]
    NonPositiveWorld { width: f32, height: f32 },
    #[error("danger threshold must be positive and finite (got {0})")]
    NonPositiveThreshold(f32),
    #[error("speed range {min}..{max} is empty or negative")]
    InvalidSpeedRange { min: f32, max: f32 },
    #[error("time step must be finite and non-negative (got {0})")]
    InvalidTimeStep(f32),
    #[error("could not parse {var}={value:?}")]
    Parse { var: &'static str, value: String },
}

/// Errors raised while assembling a `Crowd`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrowdError {
    /// Direction set and score columns disagree on resolution.
    #[error("direction set has {directions} directions but agent scores have {agents}")]
    ResolutionMismatch { directions: usize, agents: usize },
    #[error("invalid crowd configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
