//! Server-rendered page surface: list/form/confirmation flows over the same
//! gateways as the JSON API, plus the cross-gateway queue notifications the
//! back office emits after each mutation.
//!
//! Notifications are best-effort: a queue failure after a successful write
//! is logged and the request still succeeds. There is no rollback between
//! the two calls.

use crate::{
    errors::AppError,
    models::{customer::NewCustomer, message::QueueLane, product::NewProduct},
    services::{AppState, queue_service::QueueService},
    views,
};
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::warn;

/// Send a notification message, swallowing (but logging) failures.
async fn notify(queues: &QueueService, lane: QueueLane, text: String) {
    if let Err(err) = queues.send(lane, &text).await {
        warn!("queue notification to {} failed: {}", lane, err);
    }
}

/// GET `/` — section links.
pub async fn home() -> Html<String> {
    Html(views::home_page())
}

// ---- Customers ----

#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// GET `/customers`
pub async fn customers_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let customers = state.tables.list_customers().await?;
    Ok(Html(views::customers_page(&customers)))
}

/// GET `/customers/new`
pub async fn new_customer_page() -> Html<String> {
    Html(views::customer_form(None))
}

/// POST `/customers` — create, notify the order queue, redirect to the list.
pub async fn create_customer(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<CustomerForm>,
) -> Result<Response, AppError> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Ok(Html(views::customer_form(Some("Name and email are required"))).into_response());
    }

    let customer = state
        .tables
        .add_customer(NewCustomer {
            name: form.name,
            email: form.email,
            phone: form.phone,
            address: form.address,
        })
        .await?;

    notify(
        &state.queues,
        QueueLane::Order,
        format!("New customer profile created: {}", customer.name),
    )
    .await;

    Ok(Redirect::to("/customers").into_response())
}

/// GET `/customers/{id}/delete` — confirmation page, 404 when missing.
pub async fn confirm_delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let customer = state
        .tables
        .get_customer(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("customer `{id}` not found")))?;
    Ok(Html(views::confirm_delete_customer(&customer)))
}

/// POST `/customers/{id}/delete`
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.tables.delete_customer(&id).await?;
    notify(
        &state.queues,
        QueueLane::Order,
        format!("Customer profile deleted: {id}"),
    )
    .await;
    Ok(Redirect::to("/customers"))
}

// ---- Products ----

/// Product form fields arrive as strings; price and stock are validated here
/// so a typo re-renders the form instead of a generic rejection.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock_quantity: String,
    #[serde(default)]
    pub category: String,
}

/// GET `/products`
pub async fn products_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let products = state.tables.list_products().await?;
    Ok(Html(views::products_page(&products)))
}

/// GET `/products/new`
pub async fn new_product_page() -> Html<String> {
    Html(views::product_form(None))
}

/// POST `/products` — create, notify the inventory queue, redirect.
pub async fn create_product(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<ProductForm>,
) -> Result<Response, AppError> {
    if form.name.trim().is_empty() {
        return Ok(Html(views::product_form(Some("Name is required"))).into_response());
    }
    let Ok(price) = form.price.trim().parse::<f64>() else {
        return Ok(Html(views::product_form(Some("Price must be a number"))).into_response());
    };
    let Ok(stock_quantity) = form.stock_quantity.trim().parse::<i64>() else {
        return Ok(Html(views::product_form(Some("Stock quantity must be a whole number")))
            .into_response());
    };

    let product = state
        .tables
        .add_product(NewProduct {
            name: form.name,
            description: form.description,
            price,
            stock_quantity,
            category: form.category,
        })
        .await?;

    notify(
        &state.queues,
        QueueLane::Inventory,
        format!(
            "New product added: {}, Quantity: {}",
            product.name, product.stock_quantity
        ),
    )
    .await;

    Ok(Redirect::to("/products").into_response())
}

/// GET `/products/{id}/delete` — confirmation page, 404 when missing.
pub async fn confirm_delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let product = state
        .tables
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("product `{id}` not found")))?;
    Ok(Html(views::confirm_delete_product(&product)))
}

/// POST `/products/{id}/delete`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let product = state.tables.get_product(&id).await?;
    state.tables.delete_product(&id).await?;

    let name = product.map(|p| p.name).unwrap_or_else(|| id.clone());
    notify(
        &state.queues,
        QueueLane::Inventory,
        format!("Product removed: {name}"),
    )
    .await;
    Ok(Redirect::to("/products"))
}

// ---- Images ----

/// GET `/images`
pub async fn images_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let blobs = state.blobs.list().await?;
    Ok(Html(views::images_page(&blobs)))
}

/// GET `/images/upload`
pub async fn upload_image_page() -> Html<String> {
    Html(views::image_upload_form(None))
}

/// POST `/images/upload` — multipart form upload, then an order-queue note.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(upload) = read_file_field(multipart).await? else {
        return Ok(Html(views::image_upload_form(Some("Please select a file to upload")))
            .into_response());
    };
    if upload.bytes.is_empty() {
        return Ok(Html(views::image_upload_form(Some("Please select a file to upload")))
            .into_response());
    }

    let extension = upload
        .file_name
        .as_deref()
        .and_then(|n| n.rsplit_once('.').map(|(_, ext)| format!(".{ext}")));
    let content_type = upload.content_type.as_deref().unwrap_or("image/jpeg");

    state
        .blobs
        .upload(upload.bytes, content_type, extension.as_deref())
        .await?;

    let original = upload.file_name.unwrap_or_else(|| "(unnamed)".into());
    notify(
        &state.queues,
        QueueLane::Order,
        format!("Uploaded image: {original}"),
    )
    .await;

    Ok(Redirect::to("/images").into_response())
}

/// GET `/images/{name}/delete` — confirmation page, 404 when missing.
pub async fn confirm_delete_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    let blob = state.blobs.metadata(&name).await?;
    Ok(Html(views::confirm_delete_image(&blob)))
}

/// POST `/images/{name}/delete`
pub async fn delete_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Redirect, AppError> {
    state.blobs.delete(&name).await?;
    notify(
        &state.queues,
        QueueLane::Order,
        format!("Deleted image: {name}"),
    )
    .await;
    Ok(Redirect::to("/images"))
}

// ---- Files ----

/// GET `/files`
pub async fn files_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let files = state.files.list().await?;
    Ok(Html(views::files_page(&files)))
}

/// GET `/files/upload`
pub async fn upload_file_page() -> Html<String> {
    Html(views::file_upload_form(None))
}

/// POST `/files/upload` — multipart form upload, then an inventory-queue
/// note.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(upload) = read_file_field(multipart).await? else {
        return Ok(Html(views::file_upload_form(Some("Please select a file to upload")))
            .into_response());
    };
    if upload.bytes.is_empty() {
        return Ok(Html(views::file_upload_form(Some("Please select a file to upload")))
            .into_response());
    }

    let stored = state
        .files
        .upload(upload.file_name.as_deref(), upload.bytes)
        .await?;

    notify(
        &state.queues,
        QueueLane::Inventory,
        format!("Uploaded contract: {}", stored.name),
    )
    .await;

    Ok(Redirect::to("/files").into_response())
}

/// GET `/files/{name}/download` — stream the file and note the download.
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (size, file) = state.files.download(&name).await?;

    notify(
        &state.queues,
        QueueLane::Inventory,
        format!("Downloaded contract: {name}"),
    )
    .await;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
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

/// GET `/files/{name}/delete` — confirmation page built from the `exists`
/// and `size_of` point queries; 404 when the file is missing.
pub async fn confirm_delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    if !state.files.exists(&name).await? {
        return Err(AppError::not_found(format!("file `{name}` not found")));
    }
    let size = state.files.size_of(&name).await?;
    Ok(Html(views::confirm_delete_file(&name, size)))
}

/// POST `/files/{name}/delete`
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Redirect, AppError> {
    state.files.delete(&name).await?;
    notify(
        &state.queues,
        QueueLane::Inventory,
        format!("Deleted contract: {name}"),
    )
    .await;
    Ok(Redirect::to("/files"))
}

// ---- Queues ----

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    #[serde(default)]
    pub message: String,
}

/// GET `/queues` — both approximate lengths.
pub async fn queues_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let order = state.queues.approximate_length(QueueLane::Order).await?;
    let inventory = state.queues.approximate_length(QueueLane::Inventory).await?;
    Ok(Html(views::queues_page(order, inventory)))
}

/// GET `/queues/{lane}/messages` — peeked messages.
pub async fn queue_messages_page(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
) -> Result<Html<String>, AppError> {
    let messages = state.queues.peek(lane, 32).await?;
    Ok(Html(views::queue_messages_page(lane, &messages)))
}

/// GET `/queues/send`
pub async fn send_message_page() -> Html<String> {
    Html(views::send_message_form(None))
}

/// POST `/queues/{lane}/send`
pub async fn send_message(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
    axum::Form(form): axum::Form<SendMessageForm>,
) -> Result<Response, AppError> {
    if form.message.trim().is_empty() {
        return Ok(Html(views::send_message_form(Some("Message cannot be empty")))
            .into_response());
    }
    state.queues.send(lane, &form.message).await?;
    Ok(Redirect::to(&format!("/queues/{}/messages", lane_segment(lane))).into_response())
}

fn lane_segment(lane: QueueLane) -> &'static str {
    match lane {
        QueueLane::Order => "order",
        QueueLane::Inventory => "inventory",
    }
}

/// The one file field of a multipart form, fully buffered.
struct FileUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: bytes::Bytes,
}

/// Pull the `file` field out of a multipart form. `None` when the form has
/// no file field at all.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<FileUpload>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(|n| n.to_string());
        let content_type = field.content_type().map(|c| c.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(err.to_string()))?;
        return Ok(Some(FileUpload {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}
