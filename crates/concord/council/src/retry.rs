use crate::advisor::{AdvisoryCapability, Assessment, RoleContext};
use crate::error::AdvisorError;
use async_trait::async_trait;
use concord_types::Experience;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Opt-in retry decorator.
///
/// Re-invokes the inner capability after a failure as long as another attempt
/// plus the backoff still fits before the deadline.
pub struct Retrying<C> {
    inner: C,
    max_attempts: u32,
    backoff: Duration,
}

impl<C: AdvisoryCapability> Retrying<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl<C: AdvisoryCapability> AdvisoryCapability for Retrying<C> {
    async fn assess(
        &self,
        experience: &Experience,
        context: &RoleContext,
        deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        let mut attempt = 1;
        loop {
            match self.inner.assess(experience, context, deadline).await {
                Ok(assessment) => return Ok(assessment),
                Err(e) if attempt < self.max_attempts && Instant::now() + self.backoff < deadline => {
                    debug!(attempt, error = %e, "advisor failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
