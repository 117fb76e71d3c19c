#![deny(unsafe_code)]
//! # concord-identity
//!
//! The versioned, constraint-protected identity object.
//!
//! Invariant keys never change after construction. Flexible keys change one at
//! a time through [`IdentityTopology::apply`], which bumps the version and
//! appends to a history that is never rewritten. Readers get consistent
//! `Arc` snapshots; writers are serialized.

pub mod error;
pub mod history;
pub mod seed;
pub mod topology;
pub mod types;

pub use error::{IdentityError, Rejection};
pub use history::History;
pub use seed::IdentitySeed;
pub use topology::IdentityTopology;
pub use types::{Baseline, HistoryEntry, IdentityState, KeyState, SignalSource};
