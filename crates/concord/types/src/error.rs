/// A malformed [`Experience`](crate::Experience). Raised before any advisor is invoked.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("experience content is empty")]
    EmptyContent,
    #[error("experience {0} is blank")]
    BlankField(&'static str),
    #[error("experience timestamp is {ahead_ms}ms in the future (max skew {max_skew_ms}ms)")]
    FutureTimestamp { ahead_ms: i64, max_skew_ms: i64 },
}

/// A role name that does not match any advisory role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);
