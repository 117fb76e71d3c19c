use crate::error::EscalationError;
use crate::types::{ChangeRequest, Resolution};
use async_trait::async_trait;
use concord_types::{Role, Tension, VoteSet};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

/// External reasoning capability consulted for high-tension vote sets.
#[async_trait]
pub trait Escalator: Send + Sync {
    async fn resolve(
        &self,
        votes: &VoteSet,
        tensions: &[Tension],
        deadline: Instant,
    ) -> Result<Resolution, EscalationError>;
}

/// Deterministic escalator: sides with the highest-scoring role.
pub struct SimulatedEscalator {
    confidence: f64,
    change: Option<ChangeRequest>,
    calls: AtomicUsize,
}

impl SimulatedEscalator {
    pub fn new() -> Self {
        Self {
            confidence: 0.75,
            change: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_change(mut self, change: ChangeRequest) -> Self {
        self.change = Some(change);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedEscalator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Escalator for SimulatedEscalator {
    async fn resolve(
        &self,
        votes: &VoteSet,
        tensions: &[Tension],
        _deadline: Instant,
    ) -> Result<Resolution, EscalationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // first maximum wins, so ties go to the earlier role
        let favoured = votes
            .participating()
            .fold(None, |best: Option<(Role, f64)>, v| match best {
                Some((_, s)) if s >= v.score => best,
                _ => Some((v.role, v.score)),
            })
            .ok_or_else(|| EscalationError::Failed("no participating votes".into()))?;

        let axis = tensions
            .iter()
            .find(|t| t.active)
            .map(|t| t.axis.label.clone())
            .unwrap_or_default();
        let mut resolution = Resolution::new(
            json!({
                "strategy": "simulated_arbitration",
                "favoured_role": favoured.0,
                "favoured_score": favoured.1,
                "axis": axis,
            }),
            self.confidence,
        )
        .with_rationale(format!("arbitrated {axis} in favour of {}", favoured.0));
        if let Some(change) = &self.change {
            resolution = resolution.with_change(change.clone());
        }
        Ok(resolution)
    }
}

/// Always fails.
pub struct FailingEscalator;

#[async_trait]
impl Escalator for FailingEscalator {
    async fn resolve(
        &self,
        _votes: &VoteSet,
        _tensions: &[Tension],
        _deadline: Instant,
    ) -> Result<Resolution, EscalationError> {
        Err(EscalationError::Failed("simulated reasoning failure".into()))
    }
}

/// Never answers; only the engine's deadline ends the call.
pub struct StallingEscalator;

#[async_trait]
impl Escalator for StallingEscalator {
    async fn resolve(
        &self,
        _votes: &VoteSet,
        _tensions: &[Tension],
        _deadline: Instant,
    ) -> Result<Resolution, EscalationError> {
        std::future::pending().await
    }
}
