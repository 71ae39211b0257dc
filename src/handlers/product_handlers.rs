//! JSON API for product records.

use crate::{
    errors::{AppError, StorageError},
    models::product::{NewProduct, ProductInfo},
    services::{AppState, table_service::PRODUCT_PARTITION},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

/// POST `/api/products` — insert a product under a fresh row key.
pub async fn add_product(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    if new.name.trim().is_empty() {
        return Err(AppError::bad_request("Invalid product data"));
    }

    let product = state.tables.add_product(new).await?;
    info!("product added successfully: {}", product.name);

    Ok(Json(json!({
        "message": "Product added successfully",
        "productId": product.row_key,
        "productName": product.name,
    })))
}

/// GET `/api/products` — full partition scan.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductInfo>>, AppError> {
    Ok(Json(state.tables.list_products().await?))
}

/// GET `/api/products/{id}` — point lookup, 404 when absent.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductInfo>, AppError> {
    state
        .tables
        .get_product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::from(StorageError::EntityNotFound {
                partition: PRODUCT_PARTITION.to_string(),
                row: id,
            })
        })
}

/// DELETE `/api/products/{id}` — idempotent removal.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.tables.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
