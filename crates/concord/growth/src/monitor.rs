use crate::types::{
    DevelopmentBreakdown, DevelopmentLevel, GrowthCounters, GrowthEvent, GrowthSnapshot, Milestone,
    Trend,
};
use chrono::Utc;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex;
use tracing::{debug, info};

/// Decisions kept for the development level.
pub const DEFAULT_DEVELOPMENT_WINDOW: usize = 100;

/// The trend compares two windows of ten confidences.
const TREND_WINDOW: usize = 10;
const TREND_BAND: f64 = 0.02;
/// Samples needed before the development level is fully trusted.
const FULL_CONFIDENCE_SAMPLES: f64 = 50.0;

#[derive(Clone, Copy, Debug)]
struct DecisionSample {
    confidence: f64,
    aggregate: f64,
    escalated: bool,
}

#[derive(Default)]
struct Ledger {
    counters: GrowthCounters,
    seen: BTreeSet<&'static str>,
    milestones: Vec<Milestone>,
    /// Index into `milestones` of the first one not yet in a snapshot.
    unreported: usize,
    samples: VecDeque<DecisionSample>,
    sequence: u64,
    history: Vec<GrowthSnapshot>,
}

/// Counts events and publishes numbered snapshots.
pub struct GrowthMonitor {
    window: usize,
    inner: Mutex<Ledger>,
}

impl Default for GrowthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowthMonitor {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_DEVELOPMENT_WINDOW)
    }

    /// Keep the last `window` decisions. The trend needs at least twenty.
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
            inner: Mutex::new(Ledger::default()),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn record(&self, event: GrowthEvent) {
        let mut inner = self.inner.lock().expect("lock not poisoned");
        let c = &mut inner.counters;
        match &event {
            GrowthEvent::DecisionProcessed { .. } => c.decisions_processed += 1,
            GrowthEvent::EscalationTriggered => c.escalations_triggered += 1,
            GrowthEvent::EscalationFailed => c.escalation_failures += 1,
            GrowthEvent::ChangeApplied { .. } => c.changes_applied += 1,
            GrowthEvent::ChangeRejected { .. } => c.changes_rejected += 1,
            GrowthEvent::DriftDetected { .. } => c.drift_events += 1,
            GrowthEvent::Abstention { .. } => c.abstentions += 1,
            GrowthEvent::NoConsensus => c.no_consensus += 1,
        }

        if let GrowthEvent::DecisionProcessed {
            confidence,
            aggregate,
            escalated,
        } = event
        {
            inner.samples.push_back(DecisionSample {
                confidence,
                aggregate,
                escalated,
            });
            if inner.samples.len() > self.window {
                inner.samples.pop_front();
            }
            debug!(confidence, aggregate, window = inner.samples.len(), "decision sampled");
        }

        let kind = event.kind();
        if inner.seen.insert(kind) {
            let milestone = Milestone {
                kind: kind.to_string(),
                event_ordinal: inner.counters.total(),
                reached_at: Utc::now(),
            };
            info!(milestone = kind, ordinal = milestone.event_ordinal, "growth milestone reached");
            inner.milestones.push(milestone);
        }
    }

    /// Publish the next snapshot and append it to the history.
    pub fn snapshot(&self) -> GrowthSnapshot {
        let mut inner = self.inner.lock().expect("lock not poisoned");
        inner.sequence += 1;
        let snapshot = GrowthSnapshot {
            sequence: inner.sequence,
            timestamp: Utc::now(),
            counters: inner.counters.clone(),
            milestones: inner.milestones.clone(),
            new_milestones: inner.milestones[inner.unreported..].to_vec(),
            trend: trend(&inner.samples),
            development: development(&inner.samples),
        };
        inner.unreported = inner.milestones.len();
        inner.history.push(snapshot.clone());
        snapshot
    }

    pub fn counters(&self) -> GrowthCounters {
        self.inner.lock().expect("lock not poisoned").counters.clone()
    }

    pub fn milestones(&self) -> Vec<Milestone> {
        self.inner.lock().expect("lock not poisoned").milestones.clone()
    }

    pub fn trend(&self) -> Trend {
        trend(&self.inner.lock().expect("lock not poisoned").samples)
    }

    pub fn development(&self) -> DevelopmentLevel {
        development(&self.inner.lock().expect("lock not poisoned").samples)
    }

    pub fn history(&self) -> Vec<GrowthSnapshot> {
        self.inner.lock().expect("lock not poisoned").history.clone()
    }
}

/// Mean of the last ten confidences against the ten before, ±0.02.
fn trend(samples: &VecDeque<DecisionSample>) -> Trend {
    if samples.len() < 2 * TREND_WINDOW {
        return Trend::Stable;
    }
    let values: Vec<f64> = samples.iter().map(|s| s.confidence).collect();
    let split = values.len() - TREND_WINDOW;
    let recent = values[split..].iter().sum::<f64>() / TREND_WINDOW as f64;
    let previous = values[split - TREND_WINDOW..split].iter().sum::<f64>() / TREND_WINDOW as f64;
    if recent > previous + TREND_BAND {
        Trend::Growing
    } else if recent < previous - TREND_BAND {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn development(samples: &VecDeque<DecisionSample>) -> DevelopmentLevel {
    if samples.is_empty() {
        return DevelopmentLevel::default();
    }
    let n = samples.len() as f64;
    let avg_aggregate = samples.iter().map(|s| s.aggregate).sum::<f64>() / n;
    DevelopmentLevel {
        level: avg_aggregate,
        confidence: (n / FULL_CONFIDENCE_SAMPLES).min(1.0),
        samples: samples.len(),
        breakdown: DevelopmentBreakdown {
            avg_aggregate,
            avg_confidence: samples.iter().map(|s| s.confidence).sum::<f64>() / n,
            escalation_rate: samples.iter().filter(|s| s.escalated).count() as f64 / n,
        },
    }
}

impl std::fmt::Debug for GrowthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowthMonitor")
            .field("window", &self.window)
            .field("counters", &self.counters())
            .finish()
    }
}
