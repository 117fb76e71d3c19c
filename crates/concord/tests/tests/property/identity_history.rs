//! Property tests: identity versions and history stay consistent under any change sequence.
//!
//! Random sequences mixing flexible, invariant and unknown targets verify
//! that the version grows by exactly the number of accepted changes, that
//! history is contiguous, and that invariants never move.

use concord_identity::IdentityTopology;
use concord_tests::identity_seed;
use concord_types::{ChangeOrigin, DecisionId, ExperienceId, ProposedChange};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_target() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        3 => Just("communication_style"),
        3 => Just("curiosity"),
        1 => Just("name"),
        1 => Just("core_values"),
        1 => Just("unknown_region"),
        1 => Just("  "),
    ]
}

fn arb_change() -> impl Strategy<Value = ProposedChange> {
    (arb_target(), 0.0f64..=1.0).prop_map(|(target, value)| {
        let origin = ChangeOrigin::Decision(DecisionId::for_experience(ExperienceId::new()));
        ProposedChange::new(target, json!(value), origin)
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn version_counts_accepted_changes(changes in prop::collection::vec(arb_change(), 0..40)) {
        let topology = IdentityTopology::from_seed(identity_seed()).unwrap();
        let initial = topology.snapshot();

        let mut accepted = 0u64;
        for change in &changes {
            let before = topology.version();
            match topology.apply(change) {
                Ok(state) => {
                    accepted += 1;
                    prop_assert_eq!(state.version, before + 1);
                }
                Err(_) => prop_assert_eq!(topology.version(), before),
            }
        }

        let state = topology.snapshot();
        prop_assert_eq!(state.version, initial.version + accepted);
        prop_assert_eq!(state.history.len() as u64, accepted);
        prop_assert_eq!(&state.invariants, &initial.invariants);
        for (i, entry) in state.history.iter().enumerate() {
            prop_assert_eq!(entry.version, initial.version + 1 + i as u64);
            prop_assert!(state.is_flexible(&entry.key));
        }
    }

    #[test]
    fn concurrent_writers_never_share_a_version(
        changes in prop::collection::vec(arb_change(), 1..24),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let topology = Arc::new(IdentityTopology::from_seed(identity_seed()).unwrap());
            let handles: Vec<_> = changes
                .into_iter()
                .map(|change| {
                    let topology = Arc::clone(&topology);
                    tokio::spawn(async move { topology.apply(&change).map(|s| s.version) })
                })
                .collect();

            let mut versions = Vec::new();
            for handle in handles {
                if let Ok(version) = handle.await.unwrap() {
                    versions.push(version);
                }
            }
            versions.sort_unstable();
            let expected: Vec<u64> = (4..4 + versions.len() as u64).collect();
            prop_assert_eq!(versions, expected);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
