use crate::error::SynthesisError;
use concord_types::{Role, VoteSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SUM_TOLERANCE: f64 = 1e-6;

/// Per-role aggregation weights. Roles absent from the map weigh 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleWeights(BTreeMap<Role, f64>);

impl RoleWeights {
    pub fn new(weights: BTreeMap<Role, f64>) -> Self {
        Self(weights)
    }

    /// Equal weight for every role.
    pub fn uniform() -> Self {
        let w = 1.0 / Role::ALL.len() as f64;
        Self(Role::ALL.into_iter().map(|r| (r, w)).collect())
    }

    pub fn with_weight(mut self, role: Role, weight: f64) -> Self {
        self.0.insert(role, weight);
        self
    }

    pub fn get(&self, role: Role) -> f64 {
        self.0.get(&role).copied().unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), SynthesisError> {
        for (role, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(SynthesisError::InvalidWeight {
                    role: *role,
                    weight: *weight,
                });
            }
        }
        let sum: f64 = self.0.values().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(SynthesisError::WeightSum(sum));
        }
        Ok(())
    }

    /// Weights renormalized over participating roles.
    ///
    /// Abstained weight is redistributed proportionally. When every
    /// participating role weighs 0 each gets an equal share.
    pub fn effective(&self, votes: &VoteSet) -> BTreeMap<Role, f64> {
        let roles: Vec<Role> = votes.participating().map(|v| v.role).collect();
        if roles.is_empty() {
            return BTreeMap::new();
        }
        let total: f64 = roles.iter().map(|r| self.get(*r)).sum();
        if total <= 0.0 {
            let share = 1.0 / roles.len() as f64;
            return roles.into_iter().map(|r| (r, share)).collect();
        }
        roles.into_iter().map(|r| (r, self.get(r) / total)).collect()
    }

    /// Weighted aggregate of participating scores; 0 when nobody participates.
    pub fn aggregate(&self, votes: &VoteSet) -> f64 {
        self.effective(votes)
            .iter()
            .filter_map(|(role, w)| votes.score(*role).map(|s| w * s))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }
}

impl Default for RoleWeights {
    fn default() -> Self {
        Self::uniform()
    }
}
