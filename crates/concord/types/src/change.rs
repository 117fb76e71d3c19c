use crate::ids::{DecisionId, ReportId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a proposed change came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ChangeOrigin {
    Decision(DecisionId),
    /// A corrective change recommended by a drift report.
    Repair(ReportId),
}

impl fmt::Display for ChangeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decision(id) => write!(f, "{id}"),
            Self::Repair(id) => write!(f, "{id}"),
        }
    }
}

/// A request to set exactly one flexible identity region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposedChange {
    pub target: String,
    pub value: serde_json::Value,
    pub origin: ChangeOrigin,
    pub rationale: String,
}

impl ProposedChange {
    pub fn new(target: impl Into<String>, value: serde_json::Value, origin: ChangeOrigin) -> Self {
        Self {
            target: target.into(),
            value,
            origin,
            rationale: String::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn is_repair(&self) -> bool {
        matches!(self.origin, ChangeOrigin::Repair(_))
    }
}
