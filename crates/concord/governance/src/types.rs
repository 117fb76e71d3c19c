//! Approval requests, decisions and status tracking.

use concord_types::ProposedChange;
use serde::{Deserialize, Serialize};

/// A request to approve one corrective change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique identifier for this approval request.
    pub id: String,
    pub change: ProposedChange,
    /// Drift deviation that motivated the change.
    pub deviation: f64,
    pub description: String,
    pub requested_by: String,
    /// Timestamp in milliseconds when the request was created.
    pub timestamp_ms: u64,
}

impl ApprovalRequest {
    pub fn new(change: ProposedChange, deviation: f64) -> Self {
        Self {
            id: format!("apr-{}", uuid::Uuid::new_v4()),
            description: format!("set '{}' to {}", change.target, change.value),
            change,
            deviation,
            requested_by: "drift-watch".into(),
            timestamp_ms: concord_types::now_ms(),
        }
    }

    pub fn with_requested_by(mut self, who: impl Into<String>) -> Self {
        self.requested_by = who.into();
        self
    }
}

/// The outcome of an approval decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Approved,
    Denied(String),
}

/// Current status of an approval request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalStatus {
    pub request: ApprovalRequest,
    /// `None` while pending.
    pub decision: Option<ApprovalDecision>,
    pub decided_at_ms: Option<u64>,
}

impl ApprovalStatus {
    pub fn pending(request: ApprovalRequest) -> Self {
        Self {
            request,
            decision: None,
            decided_at_ms: None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    pub fn is_approved(&self) -> bool {
        matches!(self.decision, Some(ApprovalDecision::Approved))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self.decision, Some(ApprovalDecision::Denied(_)))
    }
}
