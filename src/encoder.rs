//! Report payload encoding
//!
//! Computed reports are wrapped in a small envelope carrying producer
//! metadata before they cross to the rendering collaborator, so every
//! payload records which engine instance produced it and when.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::EngineError;
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Producer metadata stamped into every payload
#[derive(Debug, Clone, Serialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    producer: &'a ReportProducer,
    generated_at_utc: String,
    kind: &'a str,
    report: &'a T,
}

/// Encoder producing JSON payloads for the rendering layer
pub struct ReportEncoder {
    producer: ReportProducer,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self::with_instance_id(Uuid::new_v4().to_string())
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id,
            },
        }
    }

    /// Wrap a computed report in the payload envelope and serialize it.
    pub fn encode<T: Serialize>(&self, kind: &str, report: &T) -> Result<String, EngineError> {
        let envelope = Envelope {
            producer: &self.producer,
            generated_at_utc: Utc::now().to_rfc3339(),
            kind,
            report,
        };
        serde_json::to_string(&envelope)
            .map_err(|e| EngineError::EncodingError(e.to_string()))
    }
}
