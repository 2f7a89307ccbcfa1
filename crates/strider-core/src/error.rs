use thiserror::Error;

/// Top-level error type for the strider kernel.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Terrain error: {0}")]
    Terrain(#[from] TerrainError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Space discretization errors.
///
/// Resolutions are validated when they are set, never at query time.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TerrainError {
    #[error("Non-positive resolution: {value} (must be > 0)")]
    NonPositiveResolution { value: f64 },
}

/// State transcription errors.
///
/// A dimension mismatch means the flat vector disagrees with the active
/// variable set and would silently corrupt optimizer state if tolerated,
/// so it is a hard failure rather than a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("State dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("No floating-base system has been bound")]
    MissingSystem,
}

/// Contact planning errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("Planner not initialized: reset it with a robot and terrain first")]
    NotInitialized,

    #[error("Foothold search region is empty")]
    EmptySearchRegion,
}
