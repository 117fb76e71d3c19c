/// Why a proposed change was refused. The identity is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("invariant violation: '{0}' is an invariant key")]
    InvariantKey(String),
    #[error("unknown region: '{0}' is not a flexible key")]
    UnknownRegion(String),
    #[error("change target is blank")]
    BlankTarget,
}

/// Errors building an identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("key '{0}' is both invariant and flexible")]
    OverlappingKey(String),
    #[error("baseline for '{0}' does not name a flexible key")]
    BaselineWithoutRegion(String),
    #[error("baseline for '{key}' expects {expected}, outside [0, 1]")]
    InvalidBaseline { key: String, expected: f64 },
    #[error("identity keys must not be blank")]
    BlankKey,
    #[error("invalid identity seed: {0}")]
    InvalidSeed(#[from] serde_json::Error),
    #[error("failed to read identity seed: {0}")]
    Io(#[from] std::io::Error),
}
