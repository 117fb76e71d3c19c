#![deny(unsafe_code)]
//! # concord-types
//!
//! Shared data model for the Concord synthesis engine.
//!
//! Every crate in the workspace speaks in these types:
//! - [`Experience`]: the immutable input to one processing cycle
//! - [`Vote`] / [`VoteSet`]: one advisor's assessment, and the full set per experience
//! - [`TensionAxis`] / [`Tension`]: predefined role pairs and their measured conflict
//! - [`Decision`] / [`ProposedChange`]: the synthesized outcome and an optional identity edit

pub mod change;
pub mod decision;
pub mod error;
pub mod experience;
pub mod ids;
pub mod role;
pub mod tension;
pub mod vote;

pub use change::{ChangeOrigin, ProposedChange};
pub use decision::{Decision, ResolutionMode};
pub use error::{UnknownRole, ValidationError};
pub use experience::Experience;
pub use ids::{DecisionId, ExperienceId, ReportId};
pub use role::Role;
pub use tension::{Tension, TensionAxis};
pub use vote::{Vote, VoteSet};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
