use concord_types::Role;

/// Configuration errors raised when building a [`SynthesisEngine`](crate::SynthesisEngine).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    #[error("weight for {role} must be finite and non-negative, got {weight}")]
    InvalidWeight { role: Role, weight: f64 },
    #[error("role weights must sum to 1, got {0}")]
    WeightSum(f64),
    #[error("escalation threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Failure of the external reasoning capability. Absorbed by the engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EscalationError {
    #[error("escalation failed: {0}")]
    Failed(String),
    #[error("escalation timed out after {0}ms")]
    Timeout(u64),
    #[error("escalation returned confidence {0} outside [0, 1]")]
    InvalidConfidence(f64),
    #[error("no escalation capability configured")]
    Unavailable,
}
