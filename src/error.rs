//! Error types for the caretrend engine
//!
//! Only the adaptation and encoding boundaries can fail; every analytic
//! path degrades to null values instead of raising.

use thiserror::Error;

/// Errors that can occur at the engine's input/output boundaries
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to adapt input rows: {0}")]
    AdaptError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
