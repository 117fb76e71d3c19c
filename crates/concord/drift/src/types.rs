use crate::error::DriftError;
use chrono::{DateTime, Utc};
use concord_identity::SignalSource;
use concord_types::{ChangeOrigin, ProposedChange, ReportId};
use serde::{Deserialize, Serialize};

/// How a drifted region should be corrected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionPolicy {
    /// Restore the last known-stable value.
    Reset,
    /// Move a numeric value this fraction of the way back to stable.
    PullBack { fraction: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Maximum tolerated |running average - baseline| per region.
    pub deviation_threshold: f64,
    /// Minimum tolerated coherence of recent confidences.
    pub coherence_floor: f64,
    /// Number of most recent decisions considered.
    pub window: usize,
    pub correction: CorrectionPolicy,
    /// Consecutive detections before the operator is alerted.
    pub alert_after: u32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            deviation_threshold: 0.2,
            coherence_floor: 0.8,
            window: 50,
            correction: CorrectionPolicy::Reset,
            alert_after: 3,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), DriftError> {
        if !self.deviation_threshold.is_finite() || self.deviation_threshold < 0.0 {
            return Err(DriftError::InvalidThreshold(self.deviation_threshold));
        }
        if !(0.0..=1.0).contains(&self.coherence_floor) {
            return Err(DriftError::InvalidCoherenceFloor(self.coherence_floor));
        }
        if let CorrectionPolicy::PullBack { fraction } = self.correction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(DriftError::InvalidFraction(fraction));
            }
        }
        if self.window == 0 {
            return Err(DriftError::EmptyWindow);
        }
        Ok(())
    }
}

/// Measured drift of one baselined region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionDrift {
    pub key: String,
    pub source: SignalSource,
    pub expected: f64,
    /// Running average of the signal over the window.
    pub observed: f64,
    pub deviation: f64,
    pub samples: usize,
    pub exceeded: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    Reset,
    PullBack,
}

/// A recommended corrective edit for one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub key: String,
    pub kind: CorrectionKind,
    pub current: serde_json::Value,
    pub recommended: serde_json::Value,
    pub deviation: f64,
}

impl Correction {
    /// The corrective change, originating from the given report.
    pub fn to_change(&self, report: ReportId) -> ProposedChange {
        ProposedChange::new(
            self.key.clone(),
            self.recommended.clone(),
            ChangeOrigin::Repair(report),
        )
        .with_rationale(format!(
            "drift correction ({:?}) for deviation {:.3}",
            self.kind, self.deviation
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub id: ReportId,
    pub timestamp: DateTime<Utc>,
    /// Largest region deviation.
    pub deviation: f64,
    pub affected: Vec<String>,
    pub corrections: Vec<Correction>,
    /// Every baselined region that had samples in the window.
    pub regions: Vec<RegionDrift>,
    pub coherence: f64,
    pub coherence_breach: bool,
    /// Decisions in the window.
    pub window: usize,
    pub consecutive: u32,
    pub alert_operator: bool,
}

impl DriftReport {
    pub fn changes(&self) -> Vec<ProposedChange> {
        self.corrections.iter().map(|c| c.to_change(self.id)).collect()
    }
}
