#![deny(unsafe_code)]
//! # concord-engine
//!
//! The Concord engine facade.
//!
//! Runs one synthesis cycle per experience (collect, analyze, synthesize,
//! apply, record) and the independent drift watch that proposes corrective
//! changes through the approval gate.

pub mod config;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod ledger;

pub use config::EngineConfig;
pub use cycle::{ChangeOutcome, CycleRecord, DriftCheckOutcome, PendingRepair, RepairOutcome, StageTimings};
pub use engine::ConcordEngine;
pub use error::{ConfigError, EngineError, LedgerError};
pub use ledger::{FailingLedger, InMemoryLedger, Ledger, LedgerEntry};
