//! Property tests: tension magnitudes stay in range and activation follows the threshold.
//!
//! For any vote set, with any mix of abstentions, every default axis yields
//! exactly one tension, sorted by descending magnitude. Swapping an axis's
//! two roles never changes its tension, and equal scores never pull apart.

use concord_tension::TensionAnalyzer;
use concord_types::{ExperienceId, Role, TensionAxis, Vote, VoteSet};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A score, or `None` for an abstention.
fn arb_ballot() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        4 => (0.0f64..=1.0).prop_map(Some),
        1 => Just(None),
    ]
}

fn arb_votes() -> impl Strategy<Value = VoteSet> {
    prop::collection::vec(arb_ballot(), 5).prop_map(|ballots| {
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

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn magnitudes_within_unit_interval(votes in arb_votes(), threshold in 0.0f64..=1.0) {
        let tensions = TensionAnalyzer::new(threshold).analyze(&votes, &TensionAxis::defaults());
        prop_assert_eq!(tensions.len(), TensionAxis::defaults().len());
        for t in &tensions {
            prop_assert!((0.0..=1.0).contains(&t.magnitude));
        }
    }

    #[test]
    fn active_iff_at_or_above_threshold(votes in arb_votes(), threshold in 0.0f64..=1.0) {
        let tensions = TensionAnalyzer::new(threshold).analyze(&votes, &TensionAxis::defaults());
        for t in &tensions {
            let sides_voted = votes.score(t.axis.first).is_some() && votes.score(t.axis.second).is_some();
            prop_assert_eq!(t.active, sides_voted && t.magnitude >= threshold);
        }
    }

    #[test]
    fn sorted_by_descending_magnitude(votes in arb_votes()) {
        let tensions = TensionAnalyzer::default().analyze(&votes, &TensionAxis::defaults());
        for pair in tensions.windows(2) {
            prop_assert!(pair[0].magnitude >= pair[1].magnitude);
        }
    }

    #[test]
    fn magnitude_is_score_distance(votes in arb_votes()) {
        let tensions = TensionAnalyzer::default().analyze(&votes, &TensionAxis::defaults());
        for t in &tensions {
            match (votes.score(t.axis.first), votes.score(t.axis.second)) {
                (Some(a), Some(b)) => prop_assert!((t.magnitude - (a - b).abs()).abs() < 1e-12),
                _ => {
                    prop_assert_eq!(t.magnitude, 0.0);
                    prop_assert!(!t.active);
                }
            }
        }
    }

    #[test]
    fn analysis_is_pure(votes in arb_votes(), threshold in 0.0f64..=1.0) {
        let analyzer = TensionAnalyzer::new(threshold);
        let axes = TensionAxis::defaults();
        prop_assert_eq!(analyzer.analyze(&votes, &axes), analyzer.analyze(&votes, &axes));
    }

    #[test]
    fn swapping_axis_roles_preserves_tension(
        votes in arb_votes(),
        first in arb_role(),
        second in arb_role(),
        threshold in 0.0f64..=1.0,
    ) {
        let analyzer = TensionAnalyzer::new(threshold);
        let forward = analyzer.analyze(&votes, &[TensionAxis::new(first, second, "forward")]);
        let reverse = analyzer.analyze(&votes, &[TensionAxis::new(second, first, "reverse")]);

        prop_assert_eq!(forward[0].magnitude, reverse[0].magnitude);
        prop_assert_eq!(forward[0].active, reverse[0].active);
    }

    #[test]
    fn equal_scores_have_no_tension(
        score in 0.0f64..=1.0,
        first in arb_role(),
        second in arb_role(),
    ) {
        let votes = VoteSet::new(ExperienceId::new())
            .with_vote(Vote::cast(first, score, "same"))
            .with_vote(Vote::cast(second, score, "same"));

        let tensions = TensionAnalyzer::new(0.0).analyze(&votes, &[TensionAxis::new(first, second, "level")]);

        prop_assert_eq!(tensions[0].magnitude, 0.0);
    }
}
