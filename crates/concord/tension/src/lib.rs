#![deny(unsafe_code)]
//! # concord-tension
//!
//! Measures disagreement between advisory roles along fixed axes.

pub mod analyzer;

pub use analyzer::{TensionAnalyzer, DEFAULT_TENSION_THRESHOLD};
