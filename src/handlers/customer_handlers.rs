//! JSON API for customer profiles.

use crate::{
    errors::{AppError, StorageError},
    models::customer::{CustomerProfile, NewCustomer},
    services::{AppState, table_service::CUSTOMER_PARTITION},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

/// POST `/api/customers` — insert a profile under a fresh row key.
pub async fn add_customer(
    State(state): State<AppState>,
    Json(new): Json<NewCustomer>,
) -> Result<impl IntoResponse, AppError> {
    if new.name.trim().is_empty() || new.email.trim().is_empty() {
        return Err(AppError::bad_request("Invalid customer data"));
    }

    let customer = state.tables.add_customer(new).await?;
    info!("customer added successfully: {}", customer.name);

    Ok(Json(json!({
        "message": "Customer added successfully",
        "customerId": customer.row_key,
        "customerName": customer.name,
    })))
}

/// GET `/api/customers` — full partition scan.
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerProfile>>, AppError> {
    Ok(Json(state.tables.list_customers().await?))
}

/// GET `/api/customers/{id}` — point lookup, 404 when absent.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomerProfile>, AppError> {
    state
        .tables
        .get_customer(&id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::from(StorageError::EntityNotFound {
                partition: CUSTOMER_PARTITION.to_string(),
                row: id,
            })
        })
}

/// DELETE `/api/customers/{id}` — idempotent removal.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.tables.delete_customer(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
