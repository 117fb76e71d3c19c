use concord_types::{Tension, TensionAxis, VoteSet};
use std::cmp::Ordering;
use tracing::debug;

pub const DEFAULT_TENSION_THRESHOLD: f64 = 0.3;

/// Pure tension analysis over a vote set.
#[derive(Clone, Debug)]
pub struct TensionAnalyzer {
    threshold: f64,
}

impl TensionAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// One tension per axis, sorted by descending magnitude.
    ///
    /// An axis with an abstained or missing side has magnitude 0 and is
    /// inactive. Ties keep axis declaration order.
    pub fn analyze(&self, votes: &VoteSet, axes: &[TensionAxis]) -> Vec<Tension> {
        let mut tensions: Vec<Tension> = axes.iter().map(|axis| self.measure(votes, axis)).collect();
        // stable sort keeps declaration order on ties
        tensions.sort_by(|a, b| {
            b.magnitude
                .partial_cmp(&a.magnitude)
                .unwrap_or(Ordering::Equal)
        });
        debug!(
            experience_id = %votes.experience_id,
            active = tensions.iter().filter(|t| t.active).count(),
            "tensions analyzed"
        );
        tensions
    }

    fn measure(&self, votes: &VoteSet, axis: &TensionAxis) -> Tension {
        let (a, b) = match (votes.score(axis.first), votes.score(axis.second)) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => {
                return Tension::inactive(axis.clone(), format!("{} did not vote", axis.first))
            }
            (_, None) => {
                return Tension::inactive(axis.clone(), format!("{} did not vote", axis.second))
            }
        };

        let magnitude = (a - b).abs().min(1.0);
        let hint = match a.partial_cmp(&b) {
            Some(Ordering::Greater) => format!("{} leans stronger on {}", axis.first, axis.label),
            Some(Ordering::Less) => format!("{} leans stronger on {}", axis.second, axis.label),
            _ => format!("balanced on {}", axis.label),
        };
        Tension {
            axis: axis.clone(),
            magnitude,
            active: magnitude >= self.threshold,
            hint,
        }
    }
}

impl Default for TensionAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TENSION_THRESHOLD)
    }
}
