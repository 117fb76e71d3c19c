use concord_council::CouncilError;
use concord_drift::DriftError;
use concord_governance::GovernanceError;
use concord_identity::{IdentityError, Rejection};
use concord_synthesis::SynthesisError;
use concord_types::ValidationError;

/// Errors from the Concord engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid experience: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Council(#[from] CouncilError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("drift error: {0}")]
    Drift(#[from] DriftError),
    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("change rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl EngineError {
    /// Every advisor abstained.
    pub fn is_no_consensus(&self) -> bool {
        matches!(self, Self::Council(CouncilError::NoConsensus { .. }))
    }
}

/// Errors from a decision ledger.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    #[error("ledger write failed: {0}")]
    WriteFailed(String),
}

/// Errors loading or validating engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
