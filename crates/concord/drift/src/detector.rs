use crate::error::DriftError;
use crate::types::{Correction, CorrectionKind, CorrectionPolicy, DriftConfig, DriftReport, RegionDrift};
use chrono::Utc;
use concord_identity::{Baseline, IdentityState, SignalSource};
use concord_types::{Decision, ReportId};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Maximum population variance of values in `[0, 1]`.
const MAX_VARIANCE: f64 = 0.25;

/// Compares recent decisions against identity baselines.
///
/// Stateful only in the consecutive-detection counter and the report log.
pub struct DriftDetector {
    config: DriftConfig,
    consecutive: Mutex<u32>,
    reports: Mutex<Vec<DriftReport>>,
}

impl DriftDetector {
    pub fn new(config: DriftConfig) -> Result<Self, DriftError> {
        config.validate()?;
        Ok(Self {
            config,
            consecutive: Mutex::new(0),
            reports: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Inspect the most recent `window` decisions. `recent` is oldest first.
    ///
    /// Returns `None` for an empty window or when nothing drifted; a clean
    /// check resets the consecutive counter.
    pub fn detect(&self, recent: &[Decision], state: &IdentityState) -> Option<DriftReport> {
        if recent.is_empty() {
            return None;
        }
        let start = recent.len().saturating_sub(self.config.window);
        let window = &recent[start..];

        let regions: Vec<RegionDrift> = state
            .baselines
            .iter()
            .filter_map(|(key, baseline)| self.measure(key, baseline, window))
            .collect();
        let coherence = coherence(window);
        let coherence_breach = coherence < self.config.coherence_floor;
        let affected: Vec<String> = regions
            .iter()
            .filter(|r| r.exceeded)
            .map(|r| r.key.clone())
            .collect();

        if affected.is_empty() && !coherence_breach {
            *self.consecutive.lock().expect("lock not poisoned") = 0;
            debug!(window = window.len(), coherence, "drift check clean");
            return None;
        }

        let consecutive = {
            let mut count = self.consecutive.lock().expect("lock not poisoned");
            *count += 1;
            *count
        };
        let corrections = regions
            .iter()
            .filter(|r| r.exceeded)
            .filter_map(|r| self.correction(r, state))
            .collect();
        let report = DriftReport {
            id: ReportId::new(),
            timestamp: Utc::now(),
            deviation: regions.iter().map(|r| r.deviation).fold(0.0, f64::max),
            affected,
            corrections,
            regions,
            coherence,
            coherence_breach,
            window: window.len(),
            consecutive,
            alert_operator: consecutive >= self.config.alert_after,
        };

        warn!(
            report_id = %report.id,
            deviation = report.deviation,
            coherence,
            affected = ?report.affected,
            consecutive,
            alert_operator = report.alert_operator,
            "identity drift detected"
        );
        self.reports
            .lock()
            .expect("lock not poisoned")
            .push(report.clone());
        Some(report)
    }

    pub fn consecutive(&self) -> u32 {
        *self.consecutive.lock().expect("lock not poisoned")
    }

    /// Every report emitted so far, oldest first.
    pub fn reports(&self) -> Vec<DriftReport> {
        self.reports.lock().expect("lock not poisoned").clone()
    }

    fn measure(&self, key: &str, baseline: &Baseline, window: &[Decision]) -> Option<RegionDrift> {
        let samples: Vec<f64> = window
            .iter()
            .filter_map(|d| signal(d, baseline.source))
            .collect();
        if samples.is_empty() {
            return None;
        }
        let observed = mean(&samples);
        let deviation = (observed - baseline.expected).abs();
        Some(RegionDrift {
            key: key.to_string(),
            source: baseline.source,
            expected: baseline.expected,
            observed,
            deviation,
            samples: samples.len(),
            exceeded: deviation > self.config.deviation_threshold,
        })
    }

    /// `None` when the region already holds the recommended value.
    fn correction(&self, region: &RegionDrift, state: &IdentityState) -> Option<Correction> {
        let current = state.flexible.get(&region.key)?.clone();
        let stable = state
            .stable
            .get(&region.key)
            .cloned()
            .unwrap_or_else(|| current.clone());

        let (kind, recommended) = match self.config.correction {
            CorrectionPolicy::PullBack { fraction } => match (current.as_f64(), stable.as_f64()) {
                (Some(c), Some(s)) => (
                    CorrectionKind::PullBack,
                    serde_json::json!(c + fraction * (s - c)),
                ),
                _ => (CorrectionKind::Reset, stable),
            },
            CorrectionPolicy::Reset => (CorrectionKind::Reset, stable),
        };
        if same_value(&recommended, &current) {
            return None;
        }
        Some(Correction {
            key: region.key.clone(),
            kind,
            current,
            recommended,
            deviation: region.deviation,
        })
    }
}

impl std::fmt::Debug for DriftDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftDetector")
            .field("config", &self.config)
            .field("consecutive", &self.consecutive())
            .finish()
    }
}

fn signal(decision: &Decision, source: SignalSource) -> Option<f64> {
    match source {
        SignalSource::Aggregate => Some(decision.aggregate),
        SignalSource::Confidence => Some(decision.confidence),
        SignalSource::Role(role) => decision.role_scores.get(&role).copied(),
    }
}

/// JSON equality, except numbers compare by value so `3` matches `3.0`.
fn same_value(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => a == b,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// `1 - variance / 0.25` of the window's confidences, in `[0, 1]`.
fn coherence(window: &[Decision]) -> f64 {
    let confidences: Vec<f64> = window.iter().map(|d| d.confidence).collect();
    if confidences.is_empty() {
        return 1.0;
    }
    let m = mean(&confidences);
    let variance = confidences.iter().map(|c| (c - m).powi(2)).sum::<f64>() / confidences.len() as f64;
    (1.0 - variance / MAX_VARIANCE).clamp(0.0, 1.0)
}
