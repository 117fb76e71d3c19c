use crate::error::{EscalationError, SynthesisError};
use crate::escalator::Escalator;
use crate::types::{ChangeRequest, Resolution, PROPOSED_CHANGE_KEY};
use crate::weights::RoleWeights;
use concord_types::{
    ChangeOrigin, Decision, DecisionId, ProposedChange, ResolutionMode, Role, Tension, VoteSet,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_ESCALATION_THRESHOLD: f64 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisConfig {
    pub weights: RoleWeights,
    /// Minimum active tension magnitude that triggers escalation.
    pub escalation_threshold: f64,
    pub escalation_timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            weights: RoleWeights::uniform(),
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            escalation_timeout: Duration::from_secs(2),
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), SynthesisError> {
        self.weights.validate()?;
        if !self.escalation_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.escalation_threshold)
        {
            return Err(SynthesisError::InvalidThreshold(self.escalation_threshold));
        }
        Ok(())
    }
}

/// Resolves a vote set and its tensions into a decision.
pub struct SynthesisEngine {
    config: SynthesisConfig,
    escalator: Option<Arc<dyn Escalator>>,
}

impl SynthesisEngine {
    pub fn new(config: SynthesisConfig) -> Result<Self, SynthesisError> {
        config.validate()?;
        Ok(Self {
            config,
            escalator: None,
        })
    }

    pub fn with_escalator(mut self, escalator: Arc<dyn Escalator>) -> Self {
        self.escalator = Some(escalator);
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// True when the strongest active tension reaches the escalation threshold.
    pub fn needs_escalation(&self, tensions: &[Tension]) -> bool {
        max_active(tensions).is_some_and(|m| m >= self.config.escalation_threshold)
    }

    pub async fn synthesize(&self, votes: &VoteSet, tensions: &[Tension]) -> Decision {
        if !self.needs_escalation(tensions) {
            return self.heuristic(votes, tensions);
        }

        match self.escalate(votes, tensions).await {
            Ok(resolution) => {
                info!(
                    experience_id = %votes.experience_id,
                    confidence = resolution.confidence,
                    "escalation resolved"
                );
                self.escalated(votes, tensions, resolution)
            }
            Err(e) => {
                warn!(
                    experience_id = %votes.experience_id,
                    error = %e,
                    "escalation failed, using heuristic result"
                );
                let mut decision = self.heuristic(votes, tensions);
                decision.escalation_failed = true;
                decision
            }
        }
    }

    /// Local weighted aggregation. Pure: equal inputs give equal decisions.
    pub fn heuristic(&self, votes: &VoteSet, tensions: &[Tension]) -> Decision {
        let id = DecisionId::for_experience(votes.experience_id);
        let effective = self.config.weights.effective(votes);
        let aggregate = self.config.weights.aggregate(votes);
        let peak = max_active(tensions).unwrap_or(0.0);

        let proposed_change = strongest_proposal(votes, &effective).map(|(role, req)| {
            let rationale = if req.rationale.is_empty() {
                format!("proposed by {role}")
            } else {
                req.rationale
            };
            ProposedChange::new(req.target, req.value, ChangeOrigin::Decision(id))
                .with_rationale(rationale)
        });

        let rationale = match tensions.iter().find(|t| t.active) {
            Some(t) => format!(
                "weighted aggregate {aggregate:.3} across {} roles; strongest tension {} at {:.2}",
                effective.len(),
                t.axis.label,
                t.magnitude
            ),
            None => format!(
                "weighted aggregate {aggregate:.3} across {} roles; no active tension",
                effective.len()
            ),
        };

        debug!(experience_id = %votes.experience_id, aggregate, "heuristic synthesis");
        Decision {
            id,
            mode: ResolutionMode::Heuristic,
            outcome: json!({
                "strategy": "weighted_aggregate",
                "aggregate": aggregate,
                "contributing_roles": effective.keys().collect::<Vec<_>>(),
            }),
            confidence: (1.0 - peak).clamp(0.0, 1.0),
            tensions: tensions.to_vec(),
            proposed_change,
            escalation_failed: false,
            aggregate,
            role_scores: role_scores(votes),
            rationale,
        }
    }

    async fn escalate(
        &self,
        votes: &VoteSet,
        tensions: &[Tension],
    ) -> Result<Resolution, EscalationError> {
        let escalator = self.escalator.as_ref().ok_or(EscalationError::Unavailable)?;
        let timeout = self.config.escalation_timeout;
        let deadline = Instant::now() + timeout;
        let resolution = tokio::time::timeout(timeout, escalator.resolve(votes, tensions, deadline))
            .await
            .map_err(|_| EscalationError::Timeout(timeout.as_millis() as u64))??;
        if !resolution.confidence.is_finite() || !(0.0..=1.0).contains(&resolution.confidence) {
            return Err(EscalationError::InvalidConfidence(resolution.confidence));
        }
        Ok(resolution)
    }

    fn escalated(&self, votes: &VoteSet, tensions: &[Tension], resolution: Resolution) -> Decision {
        let id = DecisionId::for_experience(votes.experience_id);
        let proposed_change = resolution.change.map(|req| {
            ProposedChange::new(req.target, req.value, ChangeOrigin::Decision(id))
                .with_rationale(req.rationale)
        });
        Decision {
            id,
            mode: ResolutionMode::Escalated,
            outcome: resolution.outcome,
            confidence: resolution.confidence,
            tensions: tensions.to_vec(),
            proposed_change,
            escalation_failed: false,
            aggregate: self.config.weights.aggregate(votes),
            role_scores: role_scores(votes),
            rationale: resolution.rationale,
        }
    }
}

fn max_active(tensions: &[Tension]) -> Option<f64> {
    tensions
        .iter()
        .filter(|t| t.active)
        .map(|t| t.magnitude)
        .fold(None, |m, x| Some(m.map_or(x, |m: f64| m.max(x))))
}

fn role_scores(votes: &VoteSet) -> BTreeMap<Role, f64> {
    votes.participating().map(|v| (v.role, v.score)).collect()
}

/// The `proposed_change` attachment from the vote with the highest
/// effective weight × score. Ties go to the earlier role.
fn strongest_proposal(
    votes: &VoteSet,
    effective: &BTreeMap<Role, f64>,
) -> Option<(Role, ChangeRequest)> {
    let mut best: Option<(f64, Role, ChangeRequest)> = None;
    for vote in votes.participating() {
        let Some(req) = vote
            .attachments
            .get(PROPOSED_CHANGE_KEY)
            .and_then(ChangeRequest::from_attachment)
        else {
            continue;
        };
        let strength = effective.get(&vote.role).copied().unwrap_or(0.0) * vote.score;
        if best.as_ref().map_or(true, |(s, _, _)| strength > *s) {
            best = Some((strength, vote.role, req));
        }
    }
    best.map(|(_, role, req)| (role, req))
}

impl std::fmt::Debug for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisEngine")
            .field("config", &self.config)
            .field("escalator", &self.escalator.is_some())
            .finish()
    }
}
