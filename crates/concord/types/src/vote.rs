use crate::ids::ExperienceId;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One advisor's structured assessment of an experience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub role: Role,
    /// In `[0, 1]`. Always `0.0` for an abstention.
    pub score: f64,
    pub rationale: String,
    #[serde(default)]
    pub attachments: BTreeMap<String, serde_json::Value>,
    pub abstained: bool,
}

impl Vote {
    /// A participating vote. The score is clamped into `[0, 1]`; NaN becomes 0.
    pub fn cast(role: Role, score: f64, rationale: impl Into<String>) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            role,
            score,
            rationale: rationale.into(),
            attachments: BTreeMap::new(),
            abstained: false,
        }
    }

    pub fn abstain(role: Role, reason: impl std::fmt::Display) -> Self {
        Self {
            role,
            score: 0.0,
            rationale: format!("abstained: {reason}"),
            attachments: BTreeMap::new(),
            abstained: true,
        }
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attachments.insert(key.into(), value);
        self
    }

    /// The score if this vote participates, `None` for an abstention.
    pub fn effective_score(&self) -> Option<f64> {
        (!self.abstained).then_some(self.score)
    }
}

/// All votes collected for one experience, keyed by role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteSet {
    pub experience_id: ExperienceId,
    votes: BTreeMap<Role, Vote>,
}

impl VoteSet {
    pub fn new(experience_id: ExperienceId) -> Self {
        Self {
            experience_id,
            votes: BTreeMap::new(),
        }
    }

    /// Insert a vote, replacing any earlier vote for the same role.
    pub fn insert(&mut self, vote: Vote) {
        self.votes.insert(vote.role, vote);
    }

    pub fn with_vote(mut self, vote: Vote) -> Self {
        self.insert(vote);
        self
    }

    pub fn get(&self, role: Role) -> Option<&Vote> {
        self.votes.get(&role)
    }

    /// Score of a participating vote; `None` if the role abstained or is missing.
    pub fn score(&self, role: Role) -> Option<f64> {
        self.votes.get(&role).and_then(Vote::effective_score)
    }

    /// Votes in canonical role order.
    pub fn iter(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    pub fn participating(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values().filter(|v| !v.abstained)
    }

    pub fn abstention_count(&self) -> usize {
        self.votes.values().filter(|v| v.abstained).count()
    }

    /// True when no vote participates, including the empty set.
    pub fn all_abstained(&self) -> bool {
        self.participating().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
