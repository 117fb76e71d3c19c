use concord_types::ExperienceId;

/// Failure of a single advisor call. Always absorbed into an abstention.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor failed: {0}")]
    Failed(String),
    #[error("score {0} outside [0, 1]")]
    InvalidScore(f64),
    #[error("timed out after {0}ms")]
    Timeout(u64),
    #[error("no advisor bound")]
    Unbound,
}

/// Errors surfaced by the council.
#[derive(Debug, thiserror::Error)]
pub enum CouncilError {
    #[error("no consensus: all {abstained} advisors abstained on {experience_id}")]
    NoConsensus {
        experience_id: ExperienceId,
        abstained: usize,
    },
}
