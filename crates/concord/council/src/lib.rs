#![deny(unsafe_code)]
//! # concord-council
//!
//! Collects one vote per advisory role for each experience.
//!
//! Advisors implement [`AdvisoryCapability`] and are bound to roles in an
//! [`AdvisorRegistry`]. The [`VoteCollector`] dispatches them concurrently,
//! bounds each call with a timeout, and turns every failure into an
//! abstention. Only a fully abstained council is an error.

pub mod advisor;
pub mod collector;
pub mod error;
pub mod fakes;
pub mod registry;
pub mod retry;

pub use advisor::{AdvisoryCapability, Assessment, RoleContext};
pub use collector::VoteCollector;
pub use error::{AdvisorError, CouncilError};
pub use fakes::{FailingAdvisor, FixedAdvisor, ScriptedAdvisor, SlowAdvisor};
pub use registry::{AdvisorBinding, AdvisorRegistry};
pub use retry::Retrying;
