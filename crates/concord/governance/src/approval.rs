//! Approval gate: trait definition and simulated implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::error::GovernanceError;
use crate::types::{ApprovalDecision, ApprovalRequest, ApprovalStatus};

/// Gate that corrective changes pass before they reach the identity.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Submit a request and receive its initial status.
    async fn request_approval(
        &self,
        request: ApprovalRequest,
    ) -> Result<ApprovalStatus, GovernanceError>;

    /// Current status of a previously submitted request.
    async fn check_approval(&self, id: &str) -> Result<ApprovalStatus, GovernanceError>;
}

/// A simulated approval gate for tests and the demo.
///
/// Requests whose deviation is at or below the limit are approved
/// immediately; the rest stay pending until [`approve`](Self::approve) or
/// [`deny`](Self::deny) is called.
pub struct SimulatedApprovalGate {
    auto_approve_max_deviation: f64,
    statuses: Mutex<HashMap<String, ApprovalStatus>>,
}

impl SimulatedApprovalGate {
    pub fn new(auto_approve_max_deviation: f64) -> Self {
        Self {
            auto_approve_max_deviation,
            statuses: Mutex::new(HashMap::new()),
        }
    }

    /// Approves everything.
    pub fn permissive() -> Self {
        Self::new(f64::INFINITY)
    }

    /// Holds everything pending.
    pub fn manual() -> Self {
        Self::new(f64::NEG_INFINITY)
    }

    pub fn approve(&self, id: &str) -> Result<(), GovernanceError> {
        self.decide(id, ApprovalDecision::Approved)
    }

    pub fn deny(&self, id: &str, reason: impl Into<String>) -> Result<(), GovernanceError> {
        self.decide(id, ApprovalDecision::Denied(reason.into()))
    }

    /// Ids of requests still awaiting a decision.
    pub fn pending(&self) -> Vec<String> {
        let map = self.statuses.lock().expect("lock not poisoned");
        let mut ids: Vec<String> = map
            .values()
            .filter(|s| !s.is_decided())
            .map(|s| s.request.id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn decide(&self, id: &str, decision: ApprovalDecision) -> Result<(), GovernanceError> {
        let mut map = self.statuses.lock().expect("lock not poisoned");
        let status = map
            .get_mut(id)
            .ok_or_else(|| GovernanceError::NotFound(id.to_string()))?;
        if status.is_decided() {
            return Err(GovernanceError::AlreadyDecided(id.to_string()));
        }
        info!(request_id = id, decision = ?decision, "approval decided");
        status.decision = Some(decision);
        status.decided_at_ms = Some(concord_types::now_ms());
        Ok(())
    }
}

impl Default for SimulatedApprovalGate {
    fn default() -> Self {
        Self::new(0.3)
    }
}

#[async_trait]
impl ApprovalGate for SimulatedApprovalGate {
    async fn request_approval(
        &self,
        request: ApprovalRequest,
    ) -> Result<ApprovalStatus, GovernanceError> {
        let auto_approve = request.deviation <= self.auto_approve_max_deviation;
        let mut status = ApprovalStatus::pending(request);
        if auto_approve {
            status.decision = Some(ApprovalDecision::Approved);
            status.decided_at_ms = Some(status.request.timestamp_ms);
        }

        let id = status.request.id.clone();
        self.statuses
            .lock()
            .expect("lock not poisoned")
            .insert(id, status.clone());
        Ok(status)
    }

    async fn check_approval(&self, id: &str) -> Result<ApprovalStatus, GovernanceError> {
        let map = self.statuses.lock().expect("lock not poisoned");
        map.get(id)
            .cloned()
            .ok_or_else(|| GovernanceError::NotFound(id.to_string()))
    }
}
