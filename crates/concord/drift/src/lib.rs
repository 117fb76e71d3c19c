#![deny(unsafe_code)]
//! # concord-drift
//!
//! Drift detection over a rolling window of past decisions.
//!
//! Each flexible region with a baseline is compared against the running
//! average of its signal. Regions that wander too far, or a window whose
//! confidences scatter too widely, produce a [`DriftReport`] with recommended
//! corrections. The detector never applies anything itself.

pub mod detector;
pub mod error;
pub mod types;

pub use detector::DriftDetector;
pub use error::DriftError;
pub use types::{Correction, CorrectionKind, CorrectionPolicy, DriftConfig, DriftReport, RegionDrift};
