//! Property tests: heuristic synthesis is bounded and deterministic.
//!
//! For any vote set with at least one participant:
//! - confidence is in `[0, 1]` and equals one minus the peak active tension
//! - the aggregate lies between the lowest and highest participating score
//! - the same inputs give the same decision

use concord_synthesis::{SynthesisConfig, SynthesisEngine};
use concord_tension::TensionAnalyzer;
use concord_types::{ExperienceId, ResolutionMode, Role, TensionAxis, Vote, VoteSet};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Five ballots with at least one participant.
fn arb_votes() -> impl Strategy<Value = VoteSet> {
    prop::collection::vec(prop::option::weighted(0.8, 0.0f64..1.0), 5)
        .prop_filter("at least one participant", |b| b.iter().any(Option::is_some))
        .prop_map(|ballots| {
            Role::ALL
                .into_iter()
                .zip(ballots)
                .fold(VoteSet::new(ExperienceId::new()), |set, (role, ballot)| {
                    set.with_vote(match ballot {
                        Some(score) => Vote::cast(role, score, "generated"),
                        None => Vote::abstain(role, "generated"),
                    })
                })
        })
}

/// Engine that never escalates, so every decision is heuristic.
fn heuristic_engine() -> SynthesisEngine {
    SynthesisEngine::new(SynthesisConfig {
        escalation_threshold: 1.0,
        ..SynthesisConfig::default()
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn confidence_is_one_minus_peak(votes in arb_votes()) {
        let tensions = TensionAnalyzer::default().analyze(&votes, &TensionAxis::defaults());
        let decision = heuristic_engine().heuristic(&votes, &tensions);

        prop_assert!((0.0..=1.0).contains(&decision.confidence));
        let peak = decision.max_active_magnitude();
        prop_assert!((decision.confidence - (1.0 - peak)).abs() < 1e-12);
    }

    #[test]
    fn aggregate_within_participating_range(votes in arb_votes()) {
        let tensions = TensionAnalyzer::default().analyze(&votes, &TensionAxis::defaults());
        let decision = heuristic_engine().heuristic(&votes, &tensions);

        let scores: Vec<f64> = votes.participating().map(|v| v.score).collect();
        let lo = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(decision.aggregate >= lo - 1e-9);
        prop_assert!(decision.aggregate <= hi + 1e-9);
        prop_assert_eq!(decision.role_scores.len(), scores.len());
    }

    #[test]
    fn synthesis_is_deterministic(votes in arb_votes()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let engine = heuristic_engine();
            let tensions = TensionAnalyzer::default().analyze(&votes, &TensionAxis::defaults());
            let a = engine.synthesize(&votes, &tensions).await;
            let b = engine.synthesize(&votes, &tensions).await;

            prop_assert_eq!(a.mode, ResolutionMode::Heuristic);
            prop_assert!(!a.escalation_failed);
            prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
