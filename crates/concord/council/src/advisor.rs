use crate::error::AdvisorError;
use async_trait::async_trait;
use concord_types::{Experience, Role, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::time::Instant;

/// What an advisor returns for one experience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: f64,
    pub rationale: String,
    #[serde(default)]
    pub attachments: BTreeMap<String, serde_json::Value>,
}

impl Assessment {
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
            attachments: BTreeMap::new(),
        }
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attachments.insert(key.into(), value);
        self
    }

    /// Convert into a vote, rejecting scores that are non-finite or outside `[0, 1]`.
    pub fn into_vote(self, role: Role) -> Result<Vote, AdvisorError> {
        if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
            return Err(AdvisorError::InvalidScore(self.score));
        }
        let mut vote = Vote::cast(role, self.score, self.rationale);
        vote.attachments = self.attachments;
        Ok(vote)
    }
}

/// Role-specific context handed to an advisor alongside the experience.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleContext {
    pub role: Option<Role>,
    /// Free-form description of what this role pays attention to.
    pub focus: String,
    /// Votes already cast by peers. Empty unless the role is reflective.
    pub peers: Vec<Vote>,
}

impl RoleContext {
    pub fn for_role(role: Role, focus: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            focus: focus.into(),
            peers: Vec::new(),
        }
    }

    pub fn with_peers(mut self, peers: Vec<Vote>) -> Self {
        self.peers = peers;
        self
    }

    /// Mean score of participating peers, if any.
    pub fn peer_mean(&self) -> Option<f64> {
        let scores: Vec<f64> = self.peers.iter().filter_map(Vote::effective_score).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

/// An advisor producing a structured assessment for one role.
#[async_trait]
pub trait AdvisoryCapability: Send + Sync {
    /// Assess an experience. Implementations should finish before `deadline`;
    /// the collector cancels the call when it does not.
    async fn assess(
        &self,
        experience: &Experience,
        context: &RoleContext,
        deadline: Instant,
    ) -> Result<Assessment, AdvisorError>;
}
