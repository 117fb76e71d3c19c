//! Deterministic advisors for tests and the demo.

use crate::advisor::{AdvisoryCapability, Assessment, RoleContext};
use crate::error::AdvisorError;
use async_trait::async_trait;
use concord_types::Experience;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Always returns the same assessment.
pub struct FixedAdvisor {
    score: f64,
    rationale: String,
    attachments: BTreeMap<String, serde_json::Value>,
}

impl FixedAdvisor {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            rationale: format!("fixed score {score}"),
            attachments: BTreeMap::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_attachment(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attachments.insert(key.into(), value);
        self
    }
}

#[async_trait]
impl AdvisoryCapability for FixedAdvisor {
    async fn assess(
        &self,
        _experience: &Experience,
        _context: &RoleContext,
        _deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        Ok(Assessment {
            score: self.score,
            rationale: self.rationale.clone(),
            attachments: self.attachments.clone(),
        })
    }
}

/// Always fails.
pub struct FailingAdvisor {
    reason: String,
}

impl FailingAdvisor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingAdvisor {
    fn default() -> Self {
        Self::new("simulated advisor failure")
    }
}

#[async_trait]
impl AdvisoryCapability for FailingAdvisor {
    async fn assess(
        &self,
        _experience: &Experience,
        _context: &RoleContext,
        _deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        Err(AdvisorError::Failed(self.reason.clone()))
    }
}

/// Sleeps before answering; used to exercise timeouts.
pub struct SlowAdvisor {
    delay: Duration,
    score: f64,
}

impl SlowAdvisor {
    pub fn new(delay: Duration, score: f64) -> Self {
        Self { delay, score }
    }
}

#[async_trait]
impl AdvisoryCapability for SlowAdvisor {
    async fn assess(
        &self,
        _experience: &Experience,
        _context: &RoleContext,
        _deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        tokio::time::sleep(self.delay).await;
        Ok(Assessment::new(self.score, "slow but sure"))
    }
}

/// Replays a script of outcomes, then repeats the fallback.
///
/// With `follow_peers` set it answers with the peer mean when peers are
/// present, which is how a reflective advisor is modelled in tests.
pub struct ScriptedAdvisor {
    script: Mutex<VecDeque<Result<f64, String>>>,
    fallback: f64,
    follow_peers: bool,
    calls: AtomicUsize,
    peers_seen: AtomicUsize,
}

impl ScriptedAdvisor {
    pub fn new(fallback: f64) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            follow_peers: false,
            calls: AtomicUsize::new(0),
            peers_seen: AtomicUsize::new(0),
        }
    }

    pub fn then_score(self, score: f64) -> Self {
        self.script
            .lock()
            .expect("lock not poisoned")
            .push_back(Ok(score));
        self
    }

    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("lock not poisoned")
            .push_back(Err(reason.into()));
        self
    }

    pub fn following_peers(mut self) -> Self {
        self.follow_peers = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of peer votes seen on the most recent call.
    pub fn peers_seen(&self) -> usize {
        self.peers_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryCapability for ScriptedAdvisor {
    async fn assess(
        &self,
        _experience: &Experience,
        context: &RoleContext,
        _deadline: Instant,
    ) -> Result<Assessment, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.peers_seen.store(context.peers.len(), Ordering::SeqCst);
        let next = self.script.lock().expect("lock not poisoned").pop_front();
        match next {
            Some(Ok(score)) => Ok(Assessment::new(score, "scripted")),
            Some(Err(reason)) => Err(AdvisorError::Failed(reason)),
            None => {
                let score = match (self.follow_peers, context.peer_mean()) {
                    (true, Some(mean)) => mean,
                    _ => self.fallback,
                };
                Ok(Assessment::new(score, "scripted fallback"))
            }
        }
    }
}
