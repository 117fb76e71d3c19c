//! End-to-end test: the growth monitor follows the engine.
//!
//! Verifies that:
//! - snapshot sequence numbers strictly increase
//! - each event type's first occurrence is a milestone, reported once
//! - counters match what the cycles did
//! - rising confidence shows up as a growing trend
//! - the development level averages only the configured window

use concord_council::ScriptedAdvisor;
use concord_engine::EngineConfig;
use concord_growth::{DevelopmentLevel, Trend};
use concord_synthesis::SimulatedEscalator;
use std::sync::Arc;
use concord_tests::*;
use concord_types::Role;
use serde_json::json;

#[tokio::test]
async fn snapshot_sequence_strictly_increases() {
    let (engine, _) = engine_with_ledger(uniform_council(0.5));

    let mut last = 0;
    for i in 0..5 {
        engine.process(experience(&format!("tick {i}"))).await.unwrap();
        let snapshot = engine.get_growth();
        assert!(snapshot.sequence > last);
        last = snapshot.sequence;
    }
    let history = engine.growth().history();
    assert_eq!(history.len(), 5);
    assert!(history.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[tokio::test]
async fn milestones_reported_once() {
    let registry = rebind(
        uniform_council(0.5),
        Role::Mirror,
        proposing(0.6, "communication_style", json!("direct")),
    );
    let (engine, _) = engine_with_ledger(registry);

    engine.process(experience("first")).await.unwrap();
    let first = engine.get_growth();
    let kinds: Vec<&str> = first.new_milestones.iter().map(|m| m.kind.as_str()).collect();
    assert_eq!(kinds, vec!["change_applied", "decision_processed"]);
    assert_eq!(first.milestones[0].event_ordinal, 1);

    engine.process(experience("second")).await.unwrap();
    let second = engine.get_growth();
    assert!(second.new_milestones.is_empty());
    assert_eq!(second.milestones.len(), 2);
    assert_eq!(second.counters.changes_applied, 2);
}

#[tokio::test]
async fn counters_track_mixed_cycles() {
    let registry = rebind(
        fixed_council([0.95, 0.1, 0.5, 0.5, 0.5]),
        Role::Compass,
        proposing(0.5, "name", json!("Impostor")),
    );
    let (engine, _) = engine_with_ledger(registry);

    engine.process(experience("conflict")).await.unwrap();
    let _ = engine.process(experience("")).await;

    let counters = engine.get_growth().counters;
    assert_eq!(counters.decisions_processed, 1);
    assert_eq!(counters.escalations_triggered, 1);
    assert_eq!(counters.escalation_failures, 1);
    assert_eq!(counters.changes_rejected, 1);
    assert_eq!(counters.changes_applied, 0);
    assert_eq!(counters.abstentions, 0);
}

#[tokio::test]
async fn rising_confidence_is_growing() {
    // ten moderate-tension cycles (confidence 0.6) then ten unanimous ones
    let ledger_advisor = (0..10).fold(ScriptedAdvisor::new(0.5), |a, _| a.then_score(0.9));
    let registry = rebind(uniform_council(0.5), Role::Ledger, ledger_advisor);
    let (engine, _) = engine_with_ledger(registry);

    for i in 0..19 {
        engine.process(experience(&format!("step {i}"))).await.unwrap();
    }
    assert_eq!(engine.growth().trend(), Trend::Stable);

    engine.process(experience("step 19")).await.unwrap();
    let snapshot = engine.get_growth();
    assert_eq!(snapshot.counters.decisions_processed, 20);
    assert_eq!(snapshot.trend, Trend::Growing);
}

#[tokio::test]
async fn development_level_follows_the_window() {
    let config = EngineConfig {
        growth_window: 4,
        ..EngineConfig::default()
    };
    let (engine, _) = engine_with(config, uniform_council(0.8));
    assert_eq!(engine.get_growth().development, DevelopmentLevel::default());

    for i in 0..6 {
        engine.process(experience(&format!("calm {i}"))).await.unwrap();
    }
    let development = engine.get_growth().development;

    assert_eq!(development.samples, 4);
    assert!((development.level - 0.8).abs() < 1e-9);
    assert!((development.confidence - 4.0 / 50.0).abs() < 1e-9);
    assert_eq!(development.breakdown.avg_confidence, 1.0);
    assert_eq!(development.breakdown.escalation_rate, 0.0);
}

#[tokio::test]
async fn escalated_cycles_raise_escalation_rate() {
    let (engine, _) = engine_with_ledger(fixed_council([0.9, 0.2, 0.5, 0.4, 0.6]));
    let engine = engine.with_escalator(Arc::new(SimulatedEscalator::new()));

    engine.process(experience("split")).await.unwrap();
    engine.process(experience("split again")).await.unwrap();

    let development = engine.get_growth().development;
    assert_eq!(development.samples, 2);
    assert_eq!(development.breakdown.escalation_rate, 1.0);
}
