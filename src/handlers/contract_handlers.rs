//! JSON API for the `contracts` file share.

use crate::{errors::AppError, models::file::ShareFileInfo, services::AppState};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::info;

/// Request body for `POST /api/contracts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadRequest {
    pub base64_content: String,
    pub file_name: Option<String>,
}

/// POST `/api/contracts` — decode a base64 payload and store it under a name
/// derived from the supplied file name.
pub async fn upload_contract(
    State(state): State<AppState>,
    Json(req): Json<FileUploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.base64_content.is_empty() {
        return Err(AppError::bad_request("Invalid file data"));
    }

    let bytes = super::image_handlers::decode_base64(&req.base64_content)
        .map_err(|_| AppError::bad_request("Invalid base64 file data"))?;

    let stored = state.files.upload(req.file_name.as_deref(), bytes).await?;
    info!("contract uploaded successfully: {}", stored.name);

    Ok(Json(json!({
        "message": "Contract uploaded successfully",
        "fileName": stored.name,
        "size": stored.size_bytes,
    })))
}

/// GET `/api/contracts` — every file in the share with its size.
pub async fn list_contracts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShareFileInfo>>, AppError> {
    Ok(Json(state.files.list().await?))
}

/// GET `/api/contracts/{name}` — stream the file as an attachment.
pub async fn download_contract(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (size, file) = state.files.download(&name).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&size.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// DELETE `/api/contracts/{name}` — idempotent removal.
pub async fn delete_contract(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.files.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
