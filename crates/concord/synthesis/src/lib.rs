#![deny(unsafe_code)]
//! # concord-synthesis
//!
//! Turns a vote set and its tensions into a single [`Decision`](concord_types::Decision).
//!
//! Low-tension vote sets are resolved locally by weighted aggregation. When the
//! strongest active tension crosses the escalation threshold the vote set is
//! handed to an external [`Escalator`] under a deadline; any failure there falls
//! back to the local result with `escalation_failed` set.

pub mod engine;
pub mod error;
pub mod escalator;
pub mod types;
pub mod weights;

pub use engine::{SynthesisConfig, SynthesisEngine, DEFAULT_ESCALATION_THRESHOLD};
pub use error::{EscalationError, SynthesisError};
pub use escalator::{Escalator, FailingEscalator, SimulatedEscalator, StallingEscalator};
pub use types::{ChangeRequest, Resolution};
pub use weights::RoleWeights;
