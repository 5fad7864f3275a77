//! `stockscan-ai`
//!
//! **Responsibility:** vision-model boundary for photo scans.
//!
//! This crate is intentionally **not** part of the inventory domain:
//! - It must not depend on inventory types or the store.
//! - It must not mutate inventory state.
//! - It returns raw, untrusted detections; callers normalize and clamp them.

pub mod parse;
pub mod result;
pub mod vision;

pub use parse::parse_scan_reply;
pub use result::{AiError, Detection, ScanResult};
pub use vision::{
    DisabledVisionModel, ImagePayload, OpenAiVisionClient, VisionConfig, VisionModel,
    create_vision_model,
};
