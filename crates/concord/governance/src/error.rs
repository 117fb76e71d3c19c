/// Errors from the approval gate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GovernanceError {
    #[error("no approval request with id: {0}")]
    NotFound(String),
    #[error("approval request {0} was already decided")]
    AlreadyDecided(String),
    #[error("approval gate unavailable: {0}")]
    Unavailable(String),
}
