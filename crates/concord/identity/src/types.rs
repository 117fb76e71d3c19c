use crate::history::History;
use chrono::{DateTime, Utc};
use concord_types::{ChangeOrigin, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which decision signal a flexible region is expected to track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum SignalSource {
    /// The weighted aggregate score.
    Aggregate,
    /// One role's score. Decisions where it abstained are skipped.
    Role(Role),
    /// The decision confidence.
    Confidence,
}

/// Expected signal level for a flexible region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub expected: f64,
    #[serde(default = "default_source")]
    pub source: SignalSource,
}

fn default_source() -> SignalSource {
    SignalSource::Aggregate
}

impl Baseline {
    pub fn new(expected: f64, source: SignalSource) -> Self {
        Self { expected, source }
    }

    pub fn aggregate(expected: f64) -> Self {
        Self::new(expected, SignalSource::Aggregate)
    }
}

/// One applied change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
    /// Version after the change.
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub origin: ChangeOrigin,
    pub rationale: String,
}

/// Lifecycle of a flexible key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Stable,
    ProposalReceived,
    Applied,
    Rejected,
    RepairPending,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stable => "stable",
            Self::ProposalReceived => "proposal_received",
            Self::Applied => "applied",
            Self::Rejected => "rejected",
            Self::RepairPending => "repair_pending",
        };
        f.write_str(s)
    }
}

/// A consistent view of the identity at one version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityState {
    pub invariants: BTreeMap<String, serde_json::Value>,
    pub flexible: BTreeMap<String, serde_json::Value>,
    pub version: u64,
    pub history: History,
    pub baselines: BTreeMap<String, Baseline>,
    /// Last known-stable value per flexible region.
    pub stable: BTreeMap<String, serde_json::Value>,
    pub repair_pending: BTreeSet<String>,
}

impl IdentityState {
    pub fn is_invariant(&self, key: &str) -> bool {
        self.invariants.contains_key(key)
    }

    pub fn is_flexible(&self, key: &str) -> bool {
        self.flexible.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.invariants.get(key).or_else(|| self.flexible.get(key))
    }

    /// History entries for one key, oldest first.
    pub fn history_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.history.iter().filter(move |e| e.key == key)
    }
}
