//! Records produced by a synthesis cycle and by drift checks.

use concord_drift::DriftReport;
use concord_types::{Decision, ExperienceId, ProposedChange, Tension, VoteSet};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happened to the decision's proposed change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// The decision proposed nothing.
    NoChange,
    Applied { key: String, version: u64 },
    Rejected { key: String, reason: String },
}

impl ChangeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    pub collect: Duration,
    pub analyze: Duration,
    pub synthesize: Duration,
    pub apply: Duration,
    pub total: Duration,
}

/// Everything one experience went through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub experience_id: ExperienceId,
    pub votes: VoteSet,
    pub tensions: Vec<Tension>,
    pub decision: Decision,
    pub change: ChangeOutcome,
    pub timings: StageTimings,
}

/// A corrective change waiting on the approval gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingRepair {
    pub request_id: String,
    pub change: ProposedChange,
}

/// Fate of one corrective change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepairOutcome {
    Applied { key: String, version: u64 },
    Rejected { key: String, reason: String },
    Denied { key: String, reason: String },
    Pending { key: String, request_id: String },
    GateUnavailable { key: String, reason: String },
}

impl RepairOutcome {
    pub fn key(&self) -> &str {
        match self {
            Self::Applied { key, .. }
            | Self::Rejected { key, .. }
            | Self::Denied { key, .. }
            | Self::Pending { key, .. }
            | Self::GateUnavailable { key, .. } => key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftCheckOutcome {
    /// Nothing in the ledger yet.
    NoHistory,
    /// Within tolerance; stable values were checkpointed.
    Clean { window: usize },
    Drifted {
        report: DriftReport,
        repairs: Vec<RepairOutcome>,
    },
}

impl DriftCheckOutcome {
    pub fn report(&self) -> Option<&DriftReport> {
        match self {
            Self::Drifted { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn repairs(&self) -> &[RepairOutcome] {
        match self {
            Self::Drifted { repairs, .. } => repairs,
            _ => &[],
        }
    }
}
