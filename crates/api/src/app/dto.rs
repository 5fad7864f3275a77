use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockscan_core::UserId;
use stockscan_infra::{MutationOutcome, WriteFailure};
use stockscan_inventory::{ScanSelection, ViewPage};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewRequest {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub items: Vec<ScanSelection>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: UserId,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub model: String,
    pub inventory: Vec<ScanSelection>,
}

/// A view page, plus per-record failures when a write-back partially failed.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    #[serde(flatten)]
    pub page: ViewPage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<WriteFailure>,
}

impl InventoryResponse {
    pub fn page(page: ViewPage) -> Self {
        Self {
            page,
            failures: Vec::new(),
        }
    }

    pub fn with_failures(page: ViewPage, outcome: MutationOutcome) -> Self {
        Self {
            page,
            failures: outcome.report.failures,
        }
    }
}
