//! Decision ledger: the durable memory interface and an in-memory ring.

use crate::error::LedgerError;
use async_trait::async_trait;
use concord_types::{Decision, Experience, ExperienceId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Where processed experiences and their decisions are kept.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn persist(&self, experience: &Experience, decision: &Decision) -> Result<(), LedgerError>;

    /// Up to `n` most recent decisions, oldest first.
    async fn query_recent(&self, n: usize) -> Result<Vec<Decision>, LedgerError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub experience_id: ExperienceId,
    pub participant_id: String,
    pub decision: Decision,
    pub persisted_at_ms: u64,
}

/// Bounded ring of the most recent entries.
pub struct InMemoryLedger {
    capacity: usize,
    entries: Mutex<VecDeque<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock not poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .expect("lock not poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn persist(&self, experience: &Experience, decision: &Decision) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock().expect("lock not poisoned");
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(LedgerEntry {
            experience_id: experience.id(),
            participant_id: experience.participant_id().to_string(),
            decision: decision.clone(),
            persisted_at_ms: concord_types::now_ms(),
        });
        Ok(())
    }

    async fn query_recent(&self, n: usize) -> Result<Vec<Decision>, LedgerError> {
        let entries = self.entries.lock().expect("lock not poisoned");
        let skip = entries.len().saturating_sub(n);
        Ok(entries.iter().skip(skip).map(|e| e.decision.clone()).collect())
    }
}

/// A ledger that is always down. For tests.
#[derive(Debug, Default)]
pub struct FailingLedger;

#[async_trait]
impl Ledger for FailingLedger {
    async fn persist(&self, _experience: &Experience, _decision: &Decision) -> Result<(), LedgerError> {
        Err(LedgerError::WriteFailed("simulated write failure".into()))
    }

    async fn query_recent(&self, _n: usize) -> Result<Vec<Decision>, LedgerError> {
        Err(LedgerError::Unavailable("simulated outage".into()))
    }
}
