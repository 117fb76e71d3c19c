#![deny(unsafe_code)]
//! Approval gating for corrective identity changes.
//!
//! This crate provides:
//! - **Error types** for governance failures ([`GovernanceError`]).
//! - **Core types** for approval workflows ([`ApprovalRequest`], [`ApprovalDecision`], [`ApprovalStatus`]).
//! - **Approval gate** trait and simulated implementation ([`ApprovalGate`], [`SimulatedApprovalGate`]).

pub mod approval;
pub mod error;
pub mod types;

pub use approval::{ApprovalGate, SimulatedApprovalGate};
pub use error::GovernanceError;
pub use types::{ApprovalDecision, ApprovalRequest, ApprovalStatus};
