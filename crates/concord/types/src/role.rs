use crate::error::UnknownRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of advisory roles.
///
/// Declaration order is the canonical order: it drives iteration over vote
/// sets and breaks every tie in the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persistence and lineage: what happened.
    Ledger,
    /// Consolidation and pruning: what it means.
    Garden,
    /// Self-model and reflexivity: who is seeing.
    Mirror,
    /// Priority and ethics: why act.
    Compass,
    /// Alignment and expression: with what.
    Orchestra,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Ledger,
        Role::Garden,
        Role::Mirror,
        Role::Compass,
        Role::Orchestra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ledger => "ledger",
            Self::Garden => "garden",
            Self::Mirror => "mirror",
            Self::Compass => "compass",
            Self::Orchestra => "orchestra",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
