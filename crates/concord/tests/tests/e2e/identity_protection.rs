//! End-to-end test: the identity only changes through validated flexible edits.
//!
//! Verifies that:
//! - invariant and unknown targets are rejected with the state untouched
//! - accepted changes bump the version by exactly one and append history
//! - concurrent cycles never lose or duplicate a version

use concord_engine::ChangeOutcome;
use concord_identity::{IdentityTopology, Rejection};
use concord_tests::*;
use concord_types::{ChangeOrigin, DecisionId, ExperienceId, ProposedChange, Role};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn invariant_target_rejected() {
    let registry = rebind(
        uniform_council(0.5),
        Role::Compass,
        proposing(0.6, "core_values", json!(["speed"])),
    );
    let (engine, _) = engine_with_ledger(registry);
    let before = engine.get_identity();

    let record = engine.process_cycle(experience("rewrite yourself")).await.unwrap();

    match &record.change {
        ChangeOutcome::Rejected { key, reason } => {
            assert_eq!(key, "core_values");
            assert!(reason.contains("invariant"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    let after = engine.get_identity();
    assert_eq!(after.version, before.version);
    assert_eq!(after.invariants, before.invariants);
    assert_eq!(after.history.len(), before.history.len());
}

#[tokio::test]
async fn unknown_region_rejected() {
    let registry = rebind(
        uniform_council(0.5),
        Role::Garden,
        proposing(0.6, "favourite_colour", json!("blue")),
    );
    let (engine, _) = engine_with_ledger(registry);

    let record = engine.process_cycle(experience("new trait")).await.unwrap();

    assert!(matches!(record.change, ChangeOutcome::Rejected { .. }));
    assert!(engine.get_identity().get("favourite_colour").is_none());
    assert_eq!(engine.growth().counters().changes_rejected, 1);
}

#[tokio::test]
async fn repeated_changes_keep_contiguous_history() {
    let registry = rebind(
        uniform_council(0.5),
        Role::Mirror,
        proposing(0.6, "curiosity", json!(0.55)),
    );
    let (engine, _) = engine_with_ledger(registry);

    for _ in 0..4 {
        engine.process(experience("again")).await.unwrap();
    }

    let identity = engine.get_identity();
    assert_eq!(identity.version, 7);
    let versions: Vec<u64> = identity.history.iter().map(|h| h.version).collect();
    assert_eq!(versions, vec![4, 5, 6, 7]);
    assert!(identity
        .history
        .iter()
        .all(|h| matches!(h.origin, ChangeOrigin::Decision(_))));
}

#[tokio::test]
async fn concurrent_cycles_serialize_identity_writes() {
    let registry = rebind(
        uniform_council(0.5),
        Role::Mirror,
        proposing(0.6, "communication_style", json!("direct")),
    );
    let (engine, _) = engine_with_ledger(registry);
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.process_cycle(experience(&format!("burst {i}"))).await })
        })
        .collect();
    let mut versions = Vec::new();
    for handle in handles {
        if let ChangeOutcome::Applied { version, .. } = handle.await.unwrap().unwrap().change {
            versions.push(version);
        }
    }

    versions.sort_unstable();
    assert_eq!(versions, (4..20).collect::<Vec<u64>>());
    assert_eq!(engine.get_identity().version, 19);
    assert_eq!(engine.get_identity().history.len(), 16);
}

#[test]
fn topology_rejection_names_constraint() {
    let topology = IdentityTopology::from_seed(identity_seed()).unwrap();
    let origin = ChangeOrigin::Decision(DecisionId::for_experience(ExperienceId::new()));

    let change = ProposedChange::new("name", json!("Other"), origin);
    assert_eq!(
        topology.apply(&change).unwrap_err(),
        Rejection::InvariantKey("name".into())
    );
    assert!(!topology.validate(&change));
    assert_eq!(topology.version(), 3);
}
