//! End-to-end test: drift detection and gated repair.
//!
//! A council that keeps scoring 0.95 while the curiosity baseline expects
//! 0.5 drifts the aggregate signal. Verifies that:
//! - a history matching the baseline is clean
//! - a permissive gate lets the reset through as a repair-origin change
//! - persistent drift alerts the operator after three consecutive checks
//! - the pull-back policy moves a numeric region part of the way home
//! - a manual gate holds the key until the request is approved
//! - an integer region already at its stable value is left alone

use concord_drift::{CorrectionKind, CorrectionPolicy, DriftConfig};
use concord_engine::{ConcordEngine, DriftCheckOutcome, EngineConfig, InMemoryLedger, RepairOutcome};
use concord_governance::SimulatedApprovalGate;
use concord_identity::{Baseline, KeyState};
use concord_tests::*;
use concord_types::ChangeOrigin;
use serde_json::json;
use std::sync::Arc;

/// Four drifting decisions in; curiosity now 0.9 at version 7.
async fn drifted(config: EngineConfig) -> (ConcordEngine, Arc<InMemoryLedger>) {
    let (engine, ledger) = engine_with(config, drifting_council());
    for i in 0..4 {
        engine.process(experience(&format!("push {i}"))).await.unwrap();
    }
    wait_for_ledger(&ledger, 4).await;
    assert_eq!(engine.get_identity().version, 7);
    assert_eq!(engine.get_identity().get("curiosity"), Some(&json!(0.9)));
    (engine, ledger)
}

#[tokio::test]
async fn baseline_matching_history_is_clean() {
    let (engine, ledger) = engine_with_ledger(uniform_council(0.5));
    for i in 0..3 {
        engine.process(experience(&format!("steady {i}"))).await.unwrap();
    }
    wait_for_ledger(&ledger, 3).await;

    let outcome = engine.run_drift_check().await.unwrap();

    assert_eq!(outcome, DriftCheckOutcome::Clean { window: 3 });
    assert_eq!(engine.drift().consecutive(), 0);
    assert_eq!(engine.growth().counters().drift_events, 0);
}

#[tokio::test]
async fn permissive_gate_resets_drifted_region() {
    let (engine, _) = drifted(EngineConfig::default()).await;
    let engine = engine.with_approval_gate(Arc::new(SimulatedApprovalGate::permissive()));

    let outcome = engine.run_drift_check().await.unwrap();

    let report = outcome.report().expect("drift report");
    assert_eq!(report.affected, vec!["curiosity".to_string()]);
    assert!((report.deviation - 0.45).abs() < 1e-9);
    assert_eq!(report.corrections[0].kind, CorrectionKind::Reset);
    assert_eq!(
        outcome.repairs(),
        &[RepairOutcome::Applied {
            key: "curiosity".into(),
            version: 8
        }]
    );

    let identity = engine.get_identity();
    assert_eq!(identity.get("curiosity"), Some(&json!(0.5)));
    let last = identity.history.last().unwrap();
    assert_eq!(last.origin, ChangeOrigin::Repair(report.id));
    assert_eq!(last.before, json!(0.9));
}

#[tokio::test]
async fn persistent_drift_alerts_operator() {
    let (engine, _) = drifted(EngineConfig::default()).await;
    let engine = engine.with_approval_gate(Arc::new(SimulatedApprovalGate::permissive()));

    let first = engine.run_drift_check().await.unwrap();
    let second = engine.run_drift_check().await.unwrap();
    let third = engine.run_drift_check().await.unwrap();

    assert!(!first.report().unwrap().alert_operator);
    assert!(!second.report().unwrap().alert_operator);
    let third = third.report().unwrap();
    assert_eq!(third.consecutive, 3);
    assert!(third.alert_operator);
    // the region already holds its stable value, so nothing more to correct
    assert!(third.corrections.is_empty());
    assert!(second.repairs().is_empty());
    assert_eq!(engine.growth().counters().drift_events, 3);
}

#[tokio::test]
async fn pull_back_moves_halfway() {
    let config = EngineConfig {
        drift: DriftConfig {
            correction: CorrectionPolicy::PullBack { fraction: 0.5 },
            ..DriftConfig::default()
        },
        ..EngineConfig::default()
    };
    let (engine, _) = drifted(config).await;
    let engine = engine.with_approval_gate(Arc::new(SimulatedApprovalGate::permissive()));

    let outcome = engine.run_drift_check().await.unwrap();

    let correction = &outcome.report().unwrap().corrections[0];
    assert_eq!(correction.kind, CorrectionKind::PullBack);
    let curiosity = engine.get_identity().get("curiosity").and_then(|v| v.as_f64()).unwrap();
    assert!((curiosity - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn manual_gate_holds_until_approved() {
    let gate = Arc::new(SimulatedApprovalGate::manual());
    let (engine, _) = drifted(EngineConfig::default()).await;
    let engine = engine.with_approval_gate(gate.clone());

    let outcome = engine.run_drift_check().await.unwrap();
    let request_id = match outcome.repairs() {
        [RepairOutcome::Pending { key, request_id }] => {
            assert_eq!(key, "curiosity");
            request_id.clone()
        }
        other => panic!("expected one pending repair, got {other:?}"),
    };
    assert_eq!(engine.identity().key_state("curiosity"), Some(KeyState::RepairPending));
    assert_eq!(engine.get_identity().get("curiosity"), Some(&json!(0.9)));
    assert_eq!(gate.pending(), vec![request_id.clone()]);

    // a second check must not submit the same key again
    let again = engine.run_drift_check().await.unwrap();
    assert!(again.repairs().is_empty());
    assert_eq!(gate.pending().len(), 1);

    // still undecided: resolving changes nothing
    let outcomes = engine.resolve_pending_repairs().await;
    assert!(matches!(outcomes.as_slice(), [RepairOutcome::Pending { .. }]));
    assert_eq!(engine.pending_repairs().len(), 1);

    gate.approve(&request_id).unwrap();
    let outcomes = engine.resolve_pending_repairs().await;

    assert_eq!(
        outcomes,
        vec![RepairOutcome::Applied {
            key: "curiosity".into(),
            version: 8
        }]
    );
    assert!(engine.pending_repairs().is_empty());
    assert_eq!(engine.identity().key_state("curiosity"), Some(KeyState::Stable));
    assert_eq!(engine.get_identity().get("curiosity"), Some(&json!(0.5)));
}

#[tokio::test]
async fn drift_window_bounds_history() {
    let config = EngineConfig {
        drift: DriftConfig {
            window: 2,
            ..DriftConfig::default()
        },
        ..EngineConfig::default()
    };
    let (engine, _) = drifted(config).await;

    let outcome = engine.run_drift_check().await.unwrap();

    assert_eq!(outcome.report().unwrap().window, 2);
}

#[tokio::test]
async fn pull_back_leaves_integer_region_at_stable_value() {
    let config = EngineConfig {
        drift: DriftConfig {
            correction: CorrectionPolicy::PullBack { fraction: 0.5 },
            ..DriftConfig::default()
        },
        ..EngineConfig::default()
    };
    let seed = identity_seed()
        .with_flexible("verbosity", json!(3))
        .with_baseline("verbosity", Baseline::aggregate(0.5));
    let ledger = Arc::new(InMemoryLedger::new(config.ledger_capacity));
    let engine = ConcordEngine::new(config, uniform_council(0.95), seed)
        .unwrap()
        .with_ledger(ledger.clone())
        .with_approval_gate(Arc::new(SimulatedApprovalGate::permissive()));
    for i in 0..5 {
        engine.process(experience(&format!("loud {i}"))).await.unwrap();
    }
    wait_for_ledger(&ledger, 5).await;

    let outcome = engine.run_drift_check().await.unwrap();

    let report = outcome.report().expect("drift report");
    assert!(report.affected.contains(&"verbosity".to_string()));
    assert!(report.corrections.iter().all(|c| c.key != "verbosity"));
    assert!(outcome.repairs().is_empty());
    let identity = engine.get_identity();
    assert_eq!(identity.version, 3);
    assert_eq!(identity.get("verbosity"), Some(&json!(3)));
}
