use crate::change::ProposedChange;
use crate::ids::DecisionId;
use crate::role::Role;
use crate::tension::Tension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a decision was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Local weighted aggregation.
    Heuristic,
    /// Delegated to the external reasoning capability.
    Escalated,
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Escalated => write!(f, "escalated"),
        }
    }
}

/// The synthesized outcome for one experience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub mode: ResolutionMode,
    pub outcome: serde_json::Value,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub tensions: Vec<Tension>,
    pub proposed_change: Option<ProposedChange>,
    /// Set when escalation was required but did not produce a resolution.
    pub escalation_failed: bool,
    /// Weighted aggregate of participating scores.
    pub aggregate: f64,
    /// Scores of participating votes.
    pub role_scores: BTreeMap<Role, f64>,
    pub rationale: String,
}

impl Decision {
    pub fn max_active_magnitude(&self) -> f64 {
        self.tensions
            .iter()
            .filter(|t| t.active)
            .map(|t| t.magnitude)
            .fold(0.0, f64::max)
    }

    pub fn is_escalated(&self) -> bool {
        self.mode == ResolutionMode::Escalated
    }
}
