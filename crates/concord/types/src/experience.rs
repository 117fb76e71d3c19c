use crate::error::ValidationError;
use crate::ids::ExperienceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One unit of input to the engine.
///
/// Fields are private; once built an experience is only read. The `with_*`
/// builders consume `self`, so nothing can change it after it is handed to
/// the engine or stored in a ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    id: ExperienceId,
    content: String,
    source_id: String,
    participant_id: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl Experience {
    pub fn new(
        content: impl Into<String>,
        source_id: impl Into<String>,
        participant_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ExperienceId::new(),
            content: content.into(),
            source_id: source_id.into(),
            participant_id: participant_id.into(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: ExperienceId) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> ExperienceId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Reject malformed input before any advisor sees it.
    pub fn validate(&self, max_future_skew_ms: i64) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if self.source_id.trim().is_empty() {
            return Err(ValidationError::BlankField("source_id"));
        }
        if self.participant_id.trim().is_empty() {
            return Err(ValidationError::BlankField("participant_id"));
        }
        let ahead_ms = (self.timestamp - Utc::now()).num_milliseconds();
        if ahead_ms > max_future_skew_ms {
            return Err(ValidationError::FutureTimestamp {
                ahead_ms,
                max_skew_ms: max_future_skew_ms,
            });
        }
        Ok(())
    }
}
