//! Adversarial test: corrective changes cannot get past the approval gate.
//!
//! A denied, undecided or unreachable approval must never touch the
//! identity, and a decided request cannot be decided again.

use async_trait::async_trait;
use concord_engine::{ConcordEngine, EngineConfig, RepairOutcome};
use concord_governance::{
    ApprovalGate, ApprovalRequest, ApprovalStatus, GovernanceError, SimulatedApprovalGate,
};
use concord_identity::KeyState;
use concord_tests::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct UnreachableGate;

#[async_trait]
impl ApprovalGate for UnreachableGate {
    async fn request_approval(
        &self,
        _request: ApprovalRequest,
    ) -> Result<ApprovalStatus, GovernanceError> {
        Err(GovernanceError::Unavailable("connection refused".into()))
    }

    async fn check_approval(&self, _id: &str) -> Result<ApprovalStatus, GovernanceError> {
        Err(GovernanceError::Unavailable("connection refused".into()))
    }
}

async fn drifted(config: EngineConfig, gate: Arc<dyn ApprovalGate>) -> ConcordEngine {
    let (engine, ledger) = engine_with(config, drifting_council());
    let engine = engine.with_approval_gate(gate);
    for i in 0..4 {
        engine.process(experience(&format!("push {i}"))).await.unwrap();
    }
    wait_for_ledger(&ledger, 4).await;
    engine
}

fn assert_untouched(engine: &ConcordEngine) {
    let identity = engine.get_identity();
    assert_eq!(identity.version, 7);
    assert_eq!(identity.get("curiosity"), Some(&json!(0.9)));
    assert!(identity.history.iter().all(|h| !matches!(
        h.origin,
        concord_types::ChangeOrigin::Repair(_)
    )));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn denied_repair_never_applied() {
    let gate = Arc::new(SimulatedApprovalGate::manual());
    let engine = drifted(EngineConfig::default(), gate.clone()).await;

    let outcome = engine.run_drift_check().await.unwrap();
    let request_id = match outcome.repairs() {
        [RepairOutcome::Pending { request_id, .. }] => request_id.clone(),
        other => panic!("expected pending repair, got {other:?}"),
    };
    gate.deny(&request_id, "operator says no").unwrap();

    let outcomes = engine.resolve_pending_repairs().await;

    assert_eq!(
        outcomes,
        vec![RepairOutcome::Denied {
            key: "curiosity".into(),
            reason: "operator says no".into()
        }]
    );
    assert_untouched(&engine);
    assert_eq!(engine.identity().key_state("curiosity"), Some(KeyState::Stable));
}

#[tokio::test]
async fn default_gate_holds_large_deviation() {
    // deviation 0.45 is above the default auto-approve limit of 0.3
    let engine = drifted(EngineConfig::default(), Arc::new(SimulatedApprovalGate::default())).await;

    let outcome = engine.run_drift_check().await.unwrap();

    assert!(matches!(outcome.repairs(), [RepairOutcome::Pending { .. }]));
    assert_untouched(&engine);
}

#[tokio::test]
async fn unreachable_gate_applies_nothing_and_releases_key() {
    let engine = drifted(EngineConfig::default(), Arc::new(UnreachableGate)).await;

    let outcome = engine.run_drift_check().await.unwrap();

    match outcome.repairs() {
        [RepairOutcome::GateUnavailable { key, reason }] => {
            assert_eq!(key, "curiosity");
            assert!(reason.contains("connection refused"));
        }
        other => panic!("expected gate unavailable, got {other:?}"),
    }
    assert_untouched(&engine);
    assert_eq!(engine.identity().key_state("curiosity"), Some(KeyState::Stable));
    assert!(engine.pending_repairs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn drift_watch_waits_for_a_decision() {
    let config = EngineConfig {
        drift_interval_ms: 1_000,
        ..EngineConfig::default()
    };
    let gate = Arc::new(SimulatedApprovalGate::manual());
    let engine = Arc::new(drifted(config, gate.clone()).await);
    let watch = engine.spawn_drift_watch();

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_untouched(&engine);
    let pending = gate.pending();
    assert_eq!(pending.len(), 1);

    gate.approve(&pending[0]).unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    watch.abort();

    assert_eq!(engine.get_identity().get("curiosity"), Some(&json!(0.5)));
    assert_eq!(engine.get_identity().version, 8);
}

#[tokio::test]
async fn decisions_cannot_be_replayed() {
    let gate = SimulatedApprovalGate::manual();
    let change = concord_types::ProposedChange::new(
        "curiosity",
        json!(0.5),
        concord_types::ChangeOrigin::Repair(concord_types::ReportId::new()),
    );
    let status = gate
        .request_approval(ApprovalRequest::new(change, 0.9))
        .await
        .unwrap();
    let id = status.request.id;

    gate.approve(&id).unwrap();
    assert_eq!(gate.approve(&id), Err(GovernanceError::AlreadyDecided(id.clone())));
    assert_eq!(
        gate.deny(&id, "too late"),
        Err(GovernanceError::AlreadyDecided(id.clone()))
    );
    assert!(gate.check_approval(&id).await.unwrap().is_approved());
    assert_eq!(
        gate.approve("apr-forged"),
        Err(GovernanceError::NotFound("apr-forged".into()))
    );
}
