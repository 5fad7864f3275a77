//! Vision-model port and implementations.
//!
//! - [`DisabledVisionModel`] fails every scan; used when no provider is configured.
//! - [`OpenAiVisionClient`] calls an OpenAI-compatible `POST /chat/completions`
//!   endpoint with the image inlined as a base64 data URL.
//!
//! A scan is exactly one round trip. There is no retry: a timeout or error
//! aborts the scan and the caller leaves the inventory untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use serde_json::json;

use crate::parse::parse_scan_reply;
use crate::result::{AiError, ScanResult};

const SYSTEM_PROMPT: &str = "Return a JSON structure based on the requirements of the user. \
Only return the JSON structure, nothing else. Do not return ```JSON";

const USER_PROMPT: &str = "Identify the inventory items in the image as well as their quantity. \
Use the name of item as key and its corresponding quantity as its value";

/// An uploaded photo.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// `data:<mime>;base64,<payload>` form accepted by vision chat APIs.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// External inference collaborator: photo in, item counts out.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Model identifier, e.g. `"gpt-4o"`.
    fn model_name(&self) -> &str;

    async fn scan(&self, image: &ImagePayload) -> Result<ScanResult, AiError>;
}

/// Vision settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionConfig {
    /// `"openai"` or `"disabled"`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Vision model that rejects every scan.
pub struct DisabledVisionModel;

#[async_trait]
impl VisionModel for DisabledVisionModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn scan(&self, _image: &ImagePayload) -> Result<ScanResult, AiError> {
        Err(AiError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiVisionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::InvalidInput("vision API key is not configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AiError::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }

    fn request_body(&self, image: &ImagePayload) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": [{ "type": "text", "text": SYSTEM_PROMPT }],
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": image.data_url() } },
                    ],
                },
            ],
        })
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn scan(&self, image: &ImagePayload) -> Result<ScanResult, AiError> {
        if !image.is_image() {
            return Err(AiError::InvalidInput(format!(
                "expected an image, got {}",
                image.content_type
            )));
        }

        tracing::debug!(model = %self.model, bytes = image.bytes.len(), "sending scan request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image))
            .send()
            .await
            .map_err(|e| AiError::InferenceFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::InferenceFailed(format!("vision API error {status}: {body}")));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AiError::UnparseableReply(format!("invalid completion payload: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::UnparseableReply("completion has no message content".to_string()))?;

        let detections = parse_scan_reply(&content)?;
        tracing::info!(model = %self.model, detections = detections.len(), "scan completed");

        Ok(ScanResult {
            model: self.model.clone(),
            detections,
        })
    }
}

/// Instantiate the configured vision model.
///
/// | `provider` | model |
/// |---|---|
/// | `"disabled"` | [`DisabledVisionModel`] |
/// | `"openai"` | [`OpenAiVisionClient`] |
pub fn create_vision_model(config: &VisionConfig) -> Result<Arc<dyn VisionModel>, AiError> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledVisionModel)),
        "openai" => Ok(Arc::new(OpenAiVisionClient::new(config)?)),
        other => Err(AiError::InvalidInput(format!("unknown vision provider: {other}"))),
    }
}
