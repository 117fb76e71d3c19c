use crate::config::EngineConfig;
use crate::cycle::{
    ChangeOutcome, CycleRecord, DriftCheckOutcome, PendingRepair, RepairOutcome, StageTimings,
};
use crate::error::EngineError;
use crate::ledger::{InMemoryLedger, Ledger};
use concord_council::{AdvisorRegistry, VoteCollector};
use concord_drift::{Correction, DriftDetector, DriftReport};
use concord_governance::{ApprovalDecision, ApprovalGate, ApprovalRequest, SimulatedApprovalGate};
use concord_growth::{GrowthEvent, GrowthMonitor, GrowthSnapshot};
use concord_identity::{IdentitySeed, IdentityState, IdentityTopology, KeyState};
use concord_synthesis::{Escalator, SynthesisEngine};
use concord_tension::TensionAnalyzer;
use concord_types::{Decision, Experience, ProposedChange};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// The Concord engine: one synthesis cycle per experience, plus the drift watch.
///
/// Share it behind an `Arc` to process experiences concurrently; identity
/// writes are serialized inside [`IdentityTopology`].
pub struct ConcordEngine {
    config: EngineConfig,
    collector: VoteCollector,
    analyzer: TensionAnalyzer,
    synthesis: SynthesisEngine,
    identity: IdentityTopology,
    drift: DriftDetector,
    growth: GrowthMonitor,
    ledger: Arc<dyn Ledger>,
    gate: Arc<dyn ApprovalGate>,
    pending: Mutex<Vec<PendingRepair>>,
}

impl ConcordEngine {
    /// Build an engine with an in-memory ledger, the default simulated
    /// approval gate and no escalator.
    pub fn new(
        config: EngineConfig,
        registry: AdvisorRegistry,
        seed: IdentitySeed,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let collector = VoteCollector::new(Arc::new(registry), config.advisor_timeout());
        let analyzer = TensionAnalyzer::new(config.tension_threshold);
        let synthesis = SynthesisEngine::new(config.synthesis())?;
        let identity = IdentityTopology::from_seed(seed)?;
        let drift = DriftDetector::new(config.drift.clone())?;
        let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new(config.ledger_capacity));
        let growth = GrowthMonitor::with_window(config.growth_window);

        info!(
            roles = config.roles.len(),
            axes = config.axes.len(),
            identity_version = identity.version(),
            "concord engine initialized"
        );

        Ok(Self {
            config,
            collector,
            analyzer,
            synthesis,
            identity,
            drift,
            growth,
            ledger,
            gate: Arc::new(SimulatedApprovalGate::default()),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn with_escalator(mut self, escalator: Arc<dyn Escalator>) -> Self {
        self.synthesis = self.synthesis.with_escalator(escalator);
        self
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn Ledger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_approval_gate(mut self, gate: Arc<dyn ApprovalGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn identity(&self) -> &IdentityTopology {
        &self.identity
    }

    pub fn growth(&self) -> &GrowthMonitor {
        &self.growth
    }

    pub fn drift(&self) -> &DriftDetector {
        &self.drift
    }

    /// Consistent snapshot of the current identity.
    pub fn get_identity(&self) -> Arc<IdentityState> {
        self.identity.snapshot()
    }

    /// Publish the next growth snapshot.
    pub fn get_growth(&self) -> GrowthSnapshot {
        self.growth.snapshot()
    }

    /// Corrective changes still awaiting approval.
    pub fn pending_repairs(&self) -> Vec<PendingRepair> {
        self.pending.lock().expect("lock not poisoned").clone()
    }

    /// Process one experience and return its decision.
    pub async fn process(&self, experience: Experience) -> Result<Decision, EngineError> {
        Ok(self.process_cycle(experience).await?.decision)
    }

    /// Process one experience and return everything the cycle produced.
    ///
    /// Fails only on an invalid experience or when every advisor abstains.
    pub async fn process_cycle(&self, experience: Experience) -> Result<CycleRecord, EngineError> {
        experience.validate(self.config.max_future_skew_ms)?;
        let started = Instant::now();

        let votes = match self.collector.collect(&experience, &self.config.roles).await {
            Ok(votes) => votes,
            Err(e) => {
                self.growth.record(GrowthEvent::NoConsensus);
                return Err(e.into());
            }
        };
        for vote in votes.iter().filter(|v| v.abstained) {
            self.growth.record(GrowthEvent::Abstention { role: vote.role });
        }
        let collected = Instant::now();

        let tensions = self.analyzer.analyze(&votes, &self.config.axes);
        let analyzed = Instant::now();

        let escalating = self.synthesis.needs_escalation(&tensions);
        if escalating {
            self.growth.record(GrowthEvent::EscalationTriggered);
        }
        let decision = self.synthesis.synthesize(&votes, &tensions).await;
        if decision.escalation_failed {
            self.growth.record(GrowthEvent::EscalationFailed);
        }
        let synthesized = Instant::now();

        let change = match &decision.proposed_change {
            Some(change) => self.apply_change(change),
            None => ChangeOutcome::NoChange,
        };
        let applied = Instant::now();

        self.growth.record(GrowthEvent::DecisionProcessed {
            confidence: decision.confidence,
            aggregate: decision.aggregate,
            escalated: decision.is_escalated(),
        });
        self.persist(&experience, &decision);

        let timings = StageTimings {
            collect: collected - started,
            analyze: analyzed - collected,
            synthesize: synthesized - analyzed,
            apply: applied - synthesized,
            total: applied - started,
        };
        info!(
            experience_id = %experience.id(),
            mode = %decision.mode,
            confidence = decision.confidence,
            abstentions = votes.abstention_count(),
            change_applied = change.is_applied(),
            "cycle complete"
        );

        Ok(CycleRecord {
            experience_id: experience.id(),
            votes,
            tensions,
            decision,
            change,
            timings,
        })
    }

    fn apply_change(&self, change: &ProposedChange) -> ChangeOutcome {
        match self.try_apply(change) {
            Ok(version) => ChangeOutcome::Applied {
                key: change.target.clone(),
                version,
            },
            Err(reason) => ChangeOutcome::Rejected {
                key: change.target.clone(),
                reason,
            },
        }
    }

    /// Apply through the identity and count the result; returns the new version.
    fn try_apply(&self, change: &ProposedChange) -> Result<u64, String> {
        match self.identity.apply(change) {
            Ok(state) => {
                self.growth.record(GrowthEvent::ChangeApplied {
                    key: change.target.clone(),
                });
                Ok(state.version)
            }
            Err(rejection) => {
                warn!(key = %change.target, reason = %rejection, "proposed change rejected");
                self.growth.record(GrowthEvent::ChangeRejected {
                    key: change.target.clone(),
                });
                Err(rejection.to_string())
            }
        }
    }

    fn persist(&self, experience: &Experience, decision: &Decision) {
        let ledger = Arc::clone(&self.ledger);
        let experience = experience.clone();
        let decision = decision.clone();
        tokio::spawn(async move {
            if let Err(e) = ledger.persist(&experience, &decision).await {
                warn!(experience_id = %experience.id(), error = %e, "ledger persist failed");
            }
        });
    }

    /// Check recent decisions for drift and route any corrections through
    /// the approval gate.
    ///
    /// Approved corrections are applied at once, denied ones release their
    /// key, and the rest wait for [`resolve_pending_repairs`](Self::resolve_pending_repairs).
    /// A clean check checkpoints the current flexible values as stable.
    pub async fn run_drift_check(&self) -> Result<DriftCheckOutcome, EngineError> {
        let recent = self.ledger.query_recent(self.config.drift.window).await?;
        if recent.is_empty() {
            return Ok(DriftCheckOutcome::NoHistory);
        }

        let state = self.identity.snapshot();
        let Some(report) = self.drift.detect(&recent, &state) else {
            self.identity.checkpoint_stable();
            debug!(window = recent.len(), "drift check clean");
            return Ok(DriftCheckOutcome::Clean {
                window: recent.len(),
            });
        };

        self.growth.record(GrowthEvent::DriftDetected {
            deviation: report.deviation,
        });
        if report.alert_operator {
            warn!(
                report_id = %report.id,
                consecutive = report.consecutive,
                "drift persists, operator attention required"
            );
        }

        let mut repairs = Vec::with_capacity(report.corrections.len());
        for correction in &report.corrections {
            if let Some(outcome) = self.submit_correction(&report, correction).await {
                repairs.push(outcome);
            }
        }
        Ok(DriftCheckOutcome::Drifted { report, repairs })
    }

    async fn submit_correction(
        &self,
        report: &DriftReport,
        correction: &Correction,
    ) -> Option<RepairOutcome> {
        let key = correction.key.clone();
        if self.identity.key_state(&key) == Some(KeyState::RepairPending) {
            debug!(key = %key, "repair already pending, skipping correction");
            return None;
        }
        if let Err(rejection) = self.identity.mark_repair_pending(&key) {
            warn!(key = %key, reason = %rejection, "cannot mark repair pending");
            return Some(RepairOutcome::Rejected {
                key,
                reason: rejection.to_string(),
            });
        }

        let change = correction.to_change(report.id);
        let request = ApprovalRequest::new(change.clone(), correction.deviation);
        let status = match self.gate.request_approval(request).await {
            Ok(status) => status,
            Err(e) => {
                warn!(key = %key, error = %e, "approval gate unavailable");
                self.identity.clear_repair(&key);
                return Some(RepairOutcome::GateUnavailable {
                    key,
                    reason: e.to_string(),
                });
            }
        };

        let request_id = status.request.id.clone();
        Some(self.settle(
            PendingRepair { request_id, change },
            status.decision,
        ))
    }

    fn settle(&self, repair: PendingRepair, decision: Option<ApprovalDecision>) -> RepairOutcome {
        let key = repair.change.target.clone();
        match decision {
            Some(ApprovalDecision::Approved) => match self.try_apply(&repair.change) {
                Ok(version) => RepairOutcome::Applied { key, version },
                Err(reason) => {
                    self.identity.clear_repair(&key);
                    RepairOutcome::Rejected { key, reason }
                }
            },
            Some(ApprovalDecision::Denied(reason)) => {
                info!(key = %key, reason = %reason, "correction denied");
                self.identity.clear_repair(&key);
                RepairOutcome::Denied { key, reason }
            }
            None => {
                info!(key = %key, request_id = %repair.request_id, "correction awaiting approval");
                let request_id = repair.request_id.clone();
                self.pending.lock().expect("lock not poisoned").push(repair);
                RepairOutcome::Pending { key, request_id }
            }
        }
    }

    /// Re-check every correction awaiting approval and settle the decided ones.
    pub async fn resolve_pending_repairs(&self) -> Vec<RepairOutcome> {
        let waiting = std::mem::take(&mut *self.pending.lock().expect("lock not poisoned"));
        let mut outcomes = Vec::with_capacity(waiting.len());
        for repair in waiting {
            match self.gate.check_approval(&repair.request_id).await {
                Ok(status) => outcomes.push(self.settle(repair, status.decision)),
                Err(e) => {
                    warn!(request_id = %repair.request_id, error = %e, "approval status unavailable");
                    let key = repair.change.target.clone();
                    self.pending.lock().expect("lock not poisoned").push(repair);
                    outcomes.push(RepairOutcome::GateUnavailable {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcomes
    }

    /// Run the drift watch on its own task every `drift_interval_ms`.
    ///
    /// Each tick first settles pending repairs, then runs a drift check.
    /// Abort the returned handle to stop it.
    pub fn spawn_drift_watch(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let period = engine.config.drift_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                engine.resolve_pending_repairs().await;
                match engine.run_drift_check().await {
                    Ok(DriftCheckOutcome::Drifted { report, repairs }) => info!(
                        report_id = %report.id,
                        deviation = report.deviation,
                        repairs = repairs.len(),
                        "drift watch found drift"
                    ),
                    Ok(_) => debug!("drift watch tick clean"),
                    Err(e) => warn!(error = %e, "drift check failed"),
                }
            }
        })
    }
}

impl std::fmt::Debug for ConcordEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcordEngine")
            .field("roles", &self.config.roles)
            .field("identity_version", &self.identity.version())
            .finish()
    }
}
