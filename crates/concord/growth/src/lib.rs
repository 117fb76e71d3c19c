#![deny(unsafe_code)]
//! # concord-growth
//!
//! Append-only growth accounting: event counters, first-occurrence
//! milestones, a confidence trend and a windowed development level, published
//! as numbered snapshots.

pub mod monitor;
pub mod types;

pub use monitor::GrowthMonitor;
pub use monitor::DEFAULT_DEVELOPMENT_WINDOW;
pub use types::{
    DevelopmentBreakdown, DevelopmentLevel, GrowthCounters, GrowthEvent, GrowthSnapshot, Milestone,
    Trend,
};
