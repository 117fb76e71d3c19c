//! End-to-end test: escalation failures fall back to the heuristic.
//!
//! Verifies that a failing, stalling, missing or overconfident escalator
//! yields a heuristic decision flagged `escalation_failed`, and that the
//! growth counters see both the trigger and the failure.

use async_trait::async_trait;
use concord_synthesis::{
    EscalationError, Escalator, FailingEscalator, Resolution, SimulatedEscalator, StallingEscalator,
};
use concord_tests::*;
use concord_types::{ResolutionMode, Tension, VoteSet};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn split_council() -> concord_council::AdvisorRegistry {
    fixed_council([0.95, 0.1, 0.5, 0.5, 0.5])
}

struct OverconfidentEscalator;

#[async_trait]
impl Escalator for OverconfidentEscalator {
    async fn resolve(
        &self,
        _votes: &VoteSet,
        _tensions: &[Tension],
        _deadline: Instant,
    ) -> Result<Resolution, EscalationError> {
        Ok(Resolution::new(json!({"verdict": "certain"}), 1.5))
    }
}

async fn assert_falls_back(escalator: Option<Arc<dyn Escalator>>) {
    let (engine, _) = engine_with_ledger(split_council());
    let engine = match escalator {
        Some(e) => engine.with_escalator(e),
        None => engine,
    };

    let record = engine.process_cycle(experience("torn")).await.unwrap();

    assert_eq!(record.decision.mode, ResolutionMode::Heuristic);
    assert!(record.decision.escalation_failed);
    assert_eq!(record.decision.outcome["strategy"], "weighted_aggregate");
    let peak = record.decision.max_active_magnitude();
    assert!((record.decision.confidence - (1.0 - peak)).abs() < 1e-9);

    let counters = engine.growth().counters();
    assert_eq!(counters.escalations_triggered, 1);
    assert_eq!(counters.escalation_failures, 1);
    assert_eq!(counters.decisions_processed, 1);
}

#[tokio::test]
async fn failing_escalator_falls_back() {
    assert_falls_back(Some(Arc::new(FailingEscalator))).await;
}

#[tokio::test(start_paused = true)]
async fn stalling_escalator_times_out() {
    assert_falls_back(Some(Arc::new(StallingEscalator))).await;
}

#[tokio::test]
async fn missing_escalator_falls_back() {
    assert_falls_back(None).await;
}

#[tokio::test]
async fn out_of_range_confidence_is_a_failure() {
    assert_falls_back(Some(Arc::new(OverconfidentEscalator))).await;
}

#[tokio::test]
async fn working_escalator_is_not_flagged() {
    let (engine, _) = engine_with_ledger(split_council());
    let engine = engine.with_escalator(Arc::new(SimulatedEscalator::new().with_confidence(0.8)));

    let decision = engine.process(experience("torn")).await.unwrap();

    assert_eq!(decision.mode, ResolutionMode::Escalated);
    assert!(!decision.escalation_failed);
    assert_eq!(decision.confidence, 0.8);
    assert_eq!(engine.growth().counters().escalation_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn escalation_timeout_is_configurable() {
    let config = concord_engine::EngineConfig {
        escalation_timeout_ms: 50,
        ..concord_engine::EngineConfig::default()
    };
    let (engine, _) = engine_with(config, split_council());
    let engine = engine.with_escalator(Arc::new(StallingEscalator));

    let record = engine.process_cycle(experience("torn")).await.unwrap();

    assert!(record.decision.escalation_failed);
    assert!(record.timings.synthesize >= Duration::from_millis(50));
    assert!(record.timings.synthesize < Duration::from_secs(2));
}
