//! Error types for the progress engine and snapshot boundary

/// Input validation failures raised by the engine
///
/// Nothing else can fail inside the engine: a repeat resolution is a valid
/// no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Item id must not be empty")]
    InvalidItemId,

    #[error("Base reward must be non-negative, got {0}")]
    InvalidReward(i64),
}

/// Failures while turning a persisted record back into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Destroyed item list contains an empty id")]
    EmptyItemId,

    #[error("Unknown badge id: {0}")]
    UnknownBadge(String),

    #[error("Invalid snapshot JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("xp_per_level must be greater than zero")]
    ZeroXpPerLevel,

    #[error("combo_multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    #[error("combo_timeout_ms must not be negative, got {0}")]
    NegativeTimeout(i64),

    #[error("Badge threshold '{0}' must be greater than zero")]
    ZeroThreshold(&'static str),
}
