//! Photo scan: multipart upload in, normalized and clamped item list out.
//!
//! Nothing is persisted here; the client confirms a selection through
//! `/inventory/import`.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, multipart::MultipartError},
    http::StatusCode,
    routing::{MethodRouter, post},
    Json,
};

use stockscan_ai::ImagePayload;
use stockscan_inventory::{ScanSelection, ScannedItem};

use crate::app::dto::ScanResponse;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::method_not_allowed;
use crate::app::services::AppServices;
use crate::context::UserContext;

const FILE_FIELD: &str = "file";

pub fn route(max_upload_bytes: usize) -> MethodRouter {
    post(scan_image)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .fallback(method_not_allowed)
}

/// MIME type for an upload whose part carries none, from its extension.
fn guess_content_type(file_name: Option<&str>) -> Option<String> {
    let extension = file_name?.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Oversized bodies surface as multipart read errors; keep their 413.
fn upload_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::Validation(err.body_text())
    }
}

async fn read_image(multipart: &mut Multipart) -> ApiResult<ImagePayload> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| guess_content_type(file_name.as_deref()))
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await.map_err(upload_error)?;

        if bytes.is_empty() {
            return Err(ApiError::MissingFile);
        }

        let image = ImagePayload::new(bytes.to_vec(), content_type);
        return Ok(match file_name {
            Some(name) => image.with_file_name(name),
            None => image,
        });
    }
    Err(ApiError::MissingFile)
}

pub async fn scan_image(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<ScanResponse>> {
    let image = read_image(&mut multipart).await?;
    if !image.is_image() {
        return Err(ApiError::UnsupportedMedia(format!(
            "expected an image upload, got {}",
            image.content_type
        )));
    }

    tracing::info!(
        user_id = %user.user_id(),
        bytes = image.bytes.len(),
        content_type = %image.content_type,
        "scanning image"
    );
    let result = services.vision.scan(&image).await?;

    let items = result
        .detections
        .iter()
        .map(|detection| ScannedItem::from_raw(&detection.name, detection.quantity))
        .filter(|item| !item.name.is_empty());

    Ok(Json(ScanResponse {
        model: result.model.clone(),
        inventory: ScanSelection::all_selected(items),
    }))
}
