use serde::{Deserialize, Serialize};

/// Attachment key under which an advisor may propose an identity edit.
pub const PROPOSED_CHANGE_KEY: &str = "proposed_change";

/// A change request before it is bound to a decision id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub target: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub rationale: String,
}

impl ChangeRequest {
    pub fn new(target: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            target: target.into(),
            value,
            rationale: String::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Parse a `{"target": <key>, "value": <json>}` attachment.
    ///
    /// Returns `None` for anything else, including a blank target.
    pub fn from_attachment(value: &serde_json::Value) -> Option<Self> {
        let target = value.get("target")?.as_str()?.trim();
        if target.is_empty() {
            return None;
        }
        let new_value = value.get("value")?.clone();
        let rationale = value
            .get("rationale")
            .and_then(|r| r.as_str())
            .unwrap_or_default();
        Some(Self::new(target, new_value).with_rationale(rationale))
    }
}

/// What the external reasoning capability returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: serde_json::Value,
    pub confidence: f64,
    pub change: Option<ChangeRequest>,
    #[serde(default)]
    pub rationale: String,
}

impl Resolution {
    pub fn new(outcome: serde_json::Value, confidence: f64) -> Self {
        Self {
            outcome,
            confidence,
            change: None,
            rationale: String::new(),
        }
    }

    pub fn with_change(mut self, change: ChangeRequest) -> Self {
        self.change = Some(change);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }
}
