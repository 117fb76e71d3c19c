use crate::role::Role;
use serde::{Deserialize, Serialize};

/// A predefined pair of roles whose disagreement is worth measuring.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensionAxis {
    pub first: Role,
    pub second: Role,
    pub label: String,
}

impl TensionAxis {
    pub fn new(first: Role, second: Role, label: impl Into<String>) -> Self {
        Self {
            first,
            second,
            label: label.into(),
        }
    }

    /// The six pairings among ledger, garden, mirror and compass.
    pub fn defaults() -> Vec<TensionAxis> {
        vec![
            Self::new(Role::Ledger, Role::Garden, "storage_vs_pruning"),
            Self::new(Role::Ledger, Role::Mirror, "recording_vs_reflecting"),
            Self::new(Role::Ledger, Role::Compass, "preservation_vs_direction"),
            Self::new(Role::Garden, Role::Mirror, "pattern_vs_identity"),
            Self::new(Role::Garden, Role::Compass, "meaning_vs_value"),
            Self::new(
                Role::Mirror,
                Role::Compass,
                "self_relevance_vs_strategic_value",
            ),
        ]
    }
}

/// Measured conflict along one axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tension {
    pub axis: TensionAxis,
    /// `|score(first) - score(second)|`, in `[0, 1]`.
    pub magnitude: f64,
    pub active: bool,
    pub hint: String,
}

impl Tension {
    pub fn inactive(axis: TensionAxis, hint: impl Into<String>) -> Self {
        Self {
            axis,
            magnitude: 0.0,
            active: false,
            hint: hint.into(),
        }
    }
}
