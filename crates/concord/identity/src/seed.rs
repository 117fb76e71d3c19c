use crate::error::IdentityError;
use crate::types::Baseline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Construction input for an identity, typically loaded from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentitySeed {
    #[serde(default)]
    pub invariants: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub flexible: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub baselines: BTreeMap<String, Baseline>,
    #[serde(default = "initial_version")]
    pub version: u64,
}

fn initial_version() -> u64 {
    1
}

impl IdentitySeed {
    pub fn new() -> Self {
        Self {
            version: initial_version(),
            ..Default::default()
        }
    }

    pub fn with_invariant(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.invariants.insert(key.into(), value);
        self
    }

    pub fn with_flexible(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.flexible.insert(key.into(), value);
        self
    }

    pub fn with_baseline(mut self, key: impl Into<String>, baseline: Baseline) -> Self {
        self.baselines.insert(key.into(), baseline);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, IdentityError> {
        let seed: Self = serde_json::from_str(json)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), IdentityError> {
        let keys = self
            .invariants
            .keys()
            .chain(self.flexible.keys())
            .chain(self.baselines.keys());
        for key in keys {
            if key.trim().is_empty() {
                return Err(IdentityError::BlankKey);
            }
        }
        if let Some(key) = self.invariants.keys().find(|k| self.flexible.contains_key(*k)) {
            return Err(IdentityError::OverlappingKey(key.clone()));
        }
        for (key, baseline) in &self.baselines {
            if !self.flexible.contains_key(key) {
                return Err(IdentityError::BaselineWithoutRegion(key.clone()));
            }
            if !baseline.expected.is_finite() || !(0.0..=1.0).contains(&baseline.expected) {
                return Err(IdentityError::InvalidBaseline {
                    key: key.clone(),
                    expected: baseline.expected,
                });
            }
        }
        Ok(())
    }
}
