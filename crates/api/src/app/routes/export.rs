//! CSV download of an inventory.
//!
//! `POST` converts the posted records; `GET` exports the caller's stored
//! inventory. Any other method is a 405.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::header,
    response::{IntoResponse, Response},
    routing::{MethodRouter, post},
};

use stockscan_infra::{ExportError, records_from_json, to_csv};
use stockscan_inventory::InventoryItem;

use crate::app::errors::ApiResult;
use crate::app::routes::method_not_allowed;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn route() -> MethodRouter {
    post(export_posted)
        .get(export_stored)
        .fallback(method_not_allowed)
}

fn csv_download(items: &[InventoryItem]) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=inventory.csv"),
        ],
        to_csv(items),
    )
        .into_response()
}

/// The body is parsed by hand so that any malformed payload is a 400.
pub async fn export_posted(body: Bytes) -> ApiResult<Response> {
    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ExportError::NotAnArray)?;
    let items = records_from_json(&payload)?;
    Ok(csv_download(&items))
}

pub async fn export_stored(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Response> {
    let items = services.inventory.load(user.user_id()).await?;
    tracing::info!(user_id = %user.user_id(), records = items.len(), "exporting inventory");
    Ok(csv_download(&items))
}
