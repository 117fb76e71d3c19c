/// Errors from drift configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriftError {
    #[error("deviation threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),
    #[error("coherence floor must be within [0, 1], got {0}")]
    InvalidCoherenceFloor(f64),
    #[error("pull-back fraction must be within (0, 1], got {0}")]
    InvalidFraction(f64),
    #[error("drift window must hold at least one decision")]
    EmptyWindow,
}
