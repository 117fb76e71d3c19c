use chrono::{DateTime, Utc};
use concord_types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something worth counting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GrowthEvent {
    DecisionProcessed {
        confidence: f64,
        aggregate: f64,
        #[serde(default)]
        escalated: bool,
    },
    EscalationTriggered,
    EscalationFailed,
    ChangeApplied { key: String },
    ChangeRejected { key: String },
    DriftDetected { deviation: f64 },
    Abstention { role: Role },
    NoConsensus,
}

impl GrowthEvent {
    /// Event type name; the first occurrence of each is a milestone.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DecisionProcessed { .. } => "decision_processed",
            Self::EscalationTriggered => "escalation_triggered",
            Self::EscalationFailed => "escalation_failed",
            Self::ChangeApplied { .. } => "change_applied",
            Self::ChangeRejected { .. } => "change_rejected",
            Self::DriftDetected { .. } => "drift_detected",
            Self::Abstention { .. } => "abstention",
            Self::NoConsensus => "no_consensus",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthCounters {
    pub decisions_processed: u64,
    pub escalations_triggered: u64,
    pub escalation_failures: u64,
    pub changes_applied: u64,
    pub changes_rejected: u64,
    pub drift_events: u64,
    pub abstentions: u64,
    pub no_consensus: u64,
}

impl GrowthCounters {
    pub fn total(&self) -> u64 {
        self.decisions_processed
            + self.escalations_triggered
            + self.escalation_failures
            + self.changes_applied
            + self.changes_rejected
            + self.drift_events
            + self.abstentions
            + self.no_consensus
    }
}

/// First occurrence of an event type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub kind: String,
    /// Total events recorded when it was reached, this one included.
    pub event_ordinal: u64,
    pub reached_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Growing,
    #[default]
    Stable,
    Declining,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Growing => write!(f, "growing"),
            Self::Stable => write!(f, "stable"),
            Self::Declining => write!(f, "declining"),
        }
    }
}

/// Averages over the decisions in the development window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentBreakdown {
    pub avg_aggregate: f64,
    pub avg_confidence: f64,
    /// Share of windowed decisions that were escalated.
    pub escalation_rate: f64,
}

/// How far the engine has developed, judged from recent decisions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentLevel {
    /// Mean aggregate score over the window, 0 with no decisions.
    pub level: f64,
    /// `min(1, samples / 50)`.
    pub confidence: f64,
    pub samples: usize,
    pub breakdown: DevelopmentBreakdown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthSnapshot {
    /// Strictly increasing per monitor.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub counters: GrowthCounters,
    /// Every milestone reached so far.
    pub milestones: Vec<Milestone>,
    /// Milestones reached since the previous snapshot.
    pub new_milestones: Vec<Milestone>,
    pub trend: Trend,
    pub development: DevelopmentLevel,
}
