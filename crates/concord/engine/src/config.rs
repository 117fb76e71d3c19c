use crate::error::ConfigError;
use concord_drift::{CorrectionPolicy, DriftConfig};
use concord_growth::DEFAULT_DEVELOPMENT_WINDOW;
use concord_synthesis::{RoleWeights, SynthesisConfig, DEFAULT_ESCALATION_THRESHOLD};
use concord_tension::DEFAULT_TENSION_THRESHOLD;
use concord_types::{Role, TensionAxis};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration. Durations are in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Roles consulted for every experience.
    pub roles: Vec<Role>,
    /// Per-advisor call timeout.
    pub advisor_timeout_ms: u64,
    pub tension_threshold: f64,
    pub axes: Vec<TensionAxis>,
    pub weights: RoleWeights,
    pub escalation_threshold: f64,
    pub escalation_timeout_ms: u64,
    /// How far into the future an experience timestamp may lie.
    pub max_future_skew_ms: i64,
    pub drift: DriftConfig,
    /// Period of the background drift watch.
    pub drift_interval_ms: u64,
    /// Decisions retained by the in-memory ledger.
    pub ledger_capacity: usize,
    /// Recent decisions the development level is computed over.
    pub growth_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roles: Role::ALL.to_vec(),
            advisor_timeout_ms: 1_000,
            tension_threshold: DEFAULT_TENSION_THRESHOLD,
            axes: TensionAxis::defaults(),
            weights: RoleWeights::uniform(),
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            escalation_timeout_ms: 2_000,
            max_future_skew_ms: 5_000,
            drift: DriftConfig::default(),
            drift_interval_ms: 60_000,
            ledger_capacity: 1_000,
            growth_window: DEFAULT_DEVELOPMENT_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Tighter thresholds: tensions and drift surface earlier.
    pub fn strict() -> Self {
        Self {
            tension_threshold: 0.2,
            escalation_threshold: 0.5,
            max_future_skew_ms: 1_000,
            drift: DriftConfig {
                deviation_threshold: 0.1,
                coherence_floor: 0.9,
                alert_after: 2,
                ..DriftConfig::default()
            },
            drift_interval_ms: 15_000,
            ..Self::default()
        }
    }

    /// Looser thresholds and gentler corrections.
    pub fn relaxed() -> Self {
        Self {
            advisor_timeout_ms: 5_000,
            tension_threshold: 0.4,
            escalation_threshold: 0.75,
            escalation_timeout_ms: 10_000,
            max_future_skew_ms: 60_000,
            drift: DriftConfig {
                deviation_threshold: 0.3,
                coherence_floor: 0.6,
                correction: CorrectionPolicy::PullBack { fraction: 0.5 },
                alert_after: 5,
                ..DriftConfig::default()
            },
            drift_interval_ms: 300_000,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roles.is_empty() {
            return Err(ConfigError::Invalid("at least one role is required".into()));
        }
        if self.advisor_timeout_ms == 0 {
            return Err(ConfigError::Invalid("advisor_timeout_ms must be positive".into()));
        }
        if self.escalation_timeout_ms == 0 {
            return Err(ConfigError::Invalid("escalation_timeout_ms must be positive".into()));
        }
        if self.drift_interval_ms == 0 {
            return Err(ConfigError::Invalid("drift_interval_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.tension_threshold) {
            return Err(ConfigError::Invalid(format!(
                "tension_threshold must be within [0, 1], got {}",
                self.tension_threshold
            )));
        }
        if self.max_future_skew_ms < 0 {
            return Err(ConfigError::Invalid("max_future_skew_ms must not be negative".into()));
        }
        if self.ledger_capacity == 0 {
            return Err(ConfigError::Invalid("ledger_capacity must be positive".into()));
        }
        if self.growth_window == 0 {
            return Err(ConfigError::Invalid("growth_window must be positive".into()));
        }
        if let Some(axis) = self.axes.iter().find(|a| a.first == a.second) {
            return Err(ConfigError::Invalid(format!(
                "axis '{}' pairs {} with itself",
                axis.label, axis.first
            )));
        }
        self.synthesis()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.drift
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn synthesis(&self) -> SynthesisConfig {
        SynthesisConfig {
            weights: self.weights.clone(),
            escalation_threshold: self.escalation_threshold,
            escalation_timeout: self.escalation_timeout(),
        }
    }

    pub fn advisor_timeout(&self) -> Duration {
        Duration::from_millis(self.advisor_timeout_ms)
    }

    pub fn escalation_timeout(&self) -> Duration {
        Duration::from_millis(self.escalation_timeout_ms)
    }

    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval_ms)
    }
}
