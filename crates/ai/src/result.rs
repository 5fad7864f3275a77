use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One item the model claims to see. Untrusted: the name is free text and the
/// quantity may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub name: String,
    pub quantity: i64,
}

/// Result of one scan round trip.
///
/// This is *not* an inventory change. Nothing is persisted until the user
/// confirms a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Model identifier that produced the detections.
    pub model: String,

    /// Detections in reply order.
    pub detections: Vec<Detection>,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid scan input: {0}")]
    InvalidInput(String),

    #[error("vision provider is disabled")]
    Disabled,

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("could not parse model reply: {0}")]
    UnparseableReply(String),
}
