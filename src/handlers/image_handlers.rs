//! JSON API for the `product-images` blob container. Uploads arrive as
//! base64 JSON payloads; downloads stream straight from disk.

use crate::{errors::AppError, models::blob::BlobRecord, services::AppState};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::info;

/// Request body for `POST /api/images`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadRequest {
    pub base64_image: String,
    pub file_extension: Option<String>,
    pub content_type: Option<String>,
}

/// POST `/api/images` — decode a base64 payload and store it under a fresh
/// name. A `data:...;base64,` prefix is tolerated and stripped.
pub async fn upload_image(
    State(state): State<AppState>,
    Json(req): Json<ImageUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.base64_image.is_empty() {
        return Err(AppError::bad_request("Invalid image data"));
    }

    let bytes = decode_base64(&req.base64_image)
        .map_err(|_| AppError::bad_request("Invalid base64 image data"))?;
    let content_type = req.content_type.as_deref().unwrap_or("image/jpeg");

    let record = state
        .blobs
        .upload(bytes, content_type, req.file_extension.as_deref())
        .await?;
    info!("base64 image uploaded successfully: {}", record.name);

    Ok(Json(json!({
        "message": "Image uploaded successfully",
        "fileName": record.name,
        "blobUrl": record.url,
        "size": record.size_bytes,
    })))
}

/// GET `/api/images` — every blob with content type, size, and creation time.
pub async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<BlobRecord>>, AppError> {
    Ok(Json(state.blobs.list().await?))
}

/// GET `/api/images/{name}` — stream the payload with its stored content
/// type.
pub async fn download_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (record, file) = state.blobs.download(&name).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    set_blob_headers(response.headers_mut(), &record);
    Ok(response)
}

/// DELETE `/api/images/{name}` — idempotent removal.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.blobs.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Strip any data-URI prefix and decode the standard base64 alphabet.
pub(crate) fn decode_base64(input: &str) -> Result<Bytes, base64::DecodeError> {
    let data = match input.split_once(',') {
        Some((_, rest)) => rest,
        None => input,
    };
    general_purpose::STANDARD.decode(data).map(Bytes::from)
}

fn set_blob_headers(headers: &mut HeaderMap, record: &BlobRecord) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&record.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&record.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", record.etag)) {
        headers.insert(header::ETAG, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_data_uri_prefix() {
        let plain = decode_base64("aGVsbG8=").unwrap();
        assert_eq!(&plain[..], b"hello");

        let with_prefix = decode_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(&with_prefix[..], b"hello");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_base64("not base64!!").is_err());
    }
}
