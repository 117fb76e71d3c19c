use crate::error::{AdvisorError, CouncilError};
use crate::registry::{AdvisorBinding, AdvisorRegistry};
use concord_types::{Experience, Role, Vote, VoteSet};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Dispatches one call per role and gathers the votes.
pub struct VoteCollector {
    registry: Arc<AdvisorRegistry>,
    timeout: Duration,
}

impl VoteCollector {
    pub fn new(registry: Arc<AdvisorRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &AdvisorRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Collect one vote per requested role.
    ///
    /// Non-reflective roles run concurrently; reflective roles run afterwards
    /// and see the first-wave votes. Each call is bounded by the per-call
    /// timeout. Failures, timeouts, invalid scores and unbound roles become
    /// abstentions. Fails only when every role abstains.
    pub async fn collect(
        &self,
        experience: &Experience,
        roles: &[Role],
    ) -> Result<VoteSet, CouncilError> {
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();

        let (reflective, first_wave): (Vec<Role>, Vec<Role>) = roles.iter().copied().partition(|r| {
            self.registry
                .get(*r)
                .map(|b| b.reflective)
                .unwrap_or(false)
        });

        let mut votes = VoteSet::new(experience.id());
        let first = join_all(
            first_wave
                .iter()
                .map(|role| self.dispatch(experience, *role, Vec::new())),
        )
        .await;
        for vote in first {
            votes.insert(vote);
        }

        if !reflective.is_empty() {
            let peers: Vec<Vote> = votes.iter().cloned().collect();
            let second = join_all(
                reflective
                    .iter()
                    .map(|role| self.dispatch(experience, *role, peers.clone())),
            )
            .await;
            for vote in second {
                votes.insert(vote);
            }
        }

        if votes.all_abstained() {
            warn!(experience_id = %experience.id(), roles = votes.len(), "every advisor abstained");
            return Err(CouncilError::NoConsensus {
                experience_id: experience.id(),
                abstained: votes.len(),
            });
        }

        debug!(
            experience_id = %experience.id(),
            participating = votes.participating().count(),
            abstained = votes.abstention_count(),
            "votes collected"
        );
        Ok(votes)
    }

    async fn dispatch(&self, experience: &Experience, role: Role, peers: Vec<Vote>) -> Vote {
        let outcome = match self.registry.get(role) {
            Some(binding) => self.call(binding, experience, peers).await,
            None => Err(AdvisorError::Unbound),
        };
        match outcome {
            Ok(vote) => vote,
            Err(e) => {
                warn!(role = %role, reason = %e, experience_id = %experience.id(), "advisor abstained");
                Vote::abstain(role, e)
            }
        }
    }

    async fn call(
        &self,
        binding: &AdvisorBinding,
        experience: &Experience,
        peers: Vec<Vote>,
    ) -> Result<Vote, AdvisorError> {
        let context = binding.context().with_peers(peers);
        let deadline = Instant::now() + self.timeout;
        let result = tokio::time::timeout(
            self.timeout,
            binding.capability.assess(experience, &context, deadline),
        )
        .await;

        match result {
            Ok(Ok(assessment)) => assessment.into_vote(binding.role),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AdvisorError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

impl std::fmt::Debug for VoteCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteCollector")
            .field("roles", &self.registry.roles())
            .field("timeout", &self.timeout)
            .finish()
    }
}
