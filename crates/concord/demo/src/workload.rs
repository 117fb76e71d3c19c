//! Simulated council and experience stream for the Concord demo.
//!
//! The advisors score experiences by keyword so that the demo exercises
//! agreement, mild tension, escalation and a proposed identity change
//! without any external reasoning service.

use async_trait::async_trait;
use concord_council::{
    AdvisorBinding, AdvisorError, AdvisorRegistry, AdvisoryCapability, Assessment, RoleContext,
    ScriptedAdvisor,
};
use concord_identity::{Baseline, IdentitySeed, SignalSource};
use concord_types::{Experience, Role};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;

/// Scores an experience by adding per-keyword nudges to a base score.
pub struct KeywordAdvisor {
    base: f64,
    nudges: Vec<(&'static str, f64)>,
    proposal: Option<(&'static str, Value)>,
}

impl KeywordAdvisor {
    pub fn new(nudges: Vec<(&'static str, f64)>) -> Self {
        Self {
            base: 0.5,
            nudges,
            proposal: None,
        }
    }

    /// Propose `change` whenever `trigger` appears.
    pub fn proposing(mut self, trigger: &'static str, change: Value) -> Self {
        self.proposal = Some((trigger, change));
        self
    }

    pub fn score(&self, content: &str) -> f64 {
        let content = content.to_lowercase();
        let nudged: f64 = self
            .nudges
            .iter()
            .filter(|(word, _)| content.contains(word))
            .map(|(_, delta)| delta)
            .sum();
        (self.base + nudged).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl AdvisoryCapability for KeywordAdvisor {
    async fn assess(
        &self,
        experience: &Experience,
        context: &RoleContext,
        _deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        let score = self.score(experience.content());
        let mut assessment = Assessment::new(score, format!("{} reading", context.focus));
        if let Some((trigger, change)) = &self.proposal {
            if experience.content().to_lowercase().contains(trigger) {
                assessment = assessment.with_attachment("proposed_change", change.clone());
            }
        }
        Ok(assessment)
    }
}

/// Five advisors; the orchestra is reflective and follows its peers.
pub fn demo_council() -> AdvisorRegistry {
    AdvisorRegistry::new()
        .with_advisor(
            Role::Ledger,
            Arc::new(KeywordAdvisor::new(vec![
                ("remember", 0.3),
                ("record", 0.3),
                ("forget", -0.3),
            ])),
        )
        .with_advisor(
            Role::Garden,
            Arc::new(KeywordAdvisor::new(vec![
                ("prune", 0.3),
                ("forget", 0.3),
                ("remember", -0.3),
            ])),
        )
        .with_advisor(
            Role::Mirror,
            Arc::new(
                KeywordAdvisor::new(vec![("i feel", 0.2), ("myself", 0.2)]).proposing(
                    "more direct",
                    json!({"target": "communication_style", "value": "direct"}),
                ),
            ),
        )
        .with_advisor(
            Role::Compass,
            Arc::new(KeywordAdvisor::new(vec![("goal", 0.3), ("plan", 0.2)])),
        )
        .bind(
            AdvisorBinding::new(
                Role::Orchestra,
                Arc::new(ScriptedAdvisor::new(0.5).following_peers()),
            )
            .reflective(),
        )
}

pub fn demo_identity() -> IdentitySeed {
    IdentitySeed::new()
        .with_invariant("name", json!("Concord"))
        .with_invariant("core_values", json!(["honesty", "care", "curiosity"]))
        .with_flexible("communication_style", json!("warm"))
        .with_flexible("curiosity", json!(0.5))
        .with_flexible("assertiveness", json!(0.5))
        .with_baseline("curiosity", Baseline::aggregate(0.5))
        .with_baseline("assertiveness", Baseline::new(0.5, SignalSource::Role(Role::Compass)))
        .with_version(3)
}

/// The experience stream, in order.
pub fn experiences() -> Vec<Experience> {
    [
        "Had a calm walk and noticed nothing in particular",
        "Please remember the launch date and record every detail",
        "I feel I should be more direct when I talk to myself",
        "Time to prune old habits and forget the noise",
        "Plan the next goal for the quarter",
        "Sat with a friend by the water",
    ]
    .into_iter()
    .map(|content| Experience::new(content, "demo", "participant-1"))
    .collect()
}
