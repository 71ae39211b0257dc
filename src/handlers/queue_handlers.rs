//! JSON API for the two queue lanes. Every endpoint maps one-to-one onto a
//! queue gateway operation; `process` is the receive-one-then-delete flow.

use crate::{errors::AppError, models::message::QueueLane, services::AppState};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Peek returns at most this many messages.
const PEEK_MAX: usize = 32;

/// Request body for `POST /api/queues/{lane}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Query params for `POST /api/queues/{lane}/receive`.
#[derive(Debug, Deserialize)]
pub struct ReceiveQuery {
    pub max: Option<usize>,
}

/// Query params for `DELETE /api/queues/{lane}/messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteMessageQuery {
    pub receipt: Option<String>,
}

/// POST `/api/queues/{lane}/messages` — append a message.
pub async fn send_message(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::bad_request("Invalid message data"));
    }

    let sent = state.queues.send(lane, &req.message).await?;
    info!("message sent successfully to {}", lane);

    Ok(Json(json!({
        "message": "Message sent successfully",
        "messageId": sent.message_id,
        "messageText": sent.message_text,
        "insertionTime": sent.inserted_on,
    })))
}

/// GET `/api/queues/{lane}` — peek without consuming.
pub async fn peek_messages(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state.queues.peek(lane, PEEK_MAX).await?;
    Ok(Json(json!({
        "queueName": lane.queue_name(),
        "messageCount": messages.len(),
        "messages": messages,
    })))
}

/// POST `/api/queues/{lane}/receive` — lease up to `?max=` messages (default
/// one) and return them with their receipt tokens.
pub async fn receive_messages(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
    Query(query): Query<ReceiveQuery>,
) -> Result<impl IntoResponse, AppError> {
    let max = query.max.unwrap_or(1).clamp(1, PEEK_MAX);
    let messages = state.queues.receive(lane, max).await?;
    Ok(Json(json!({
        "queueName": lane.queue_name(),
        "messageCount": messages.len(),
        "messages": messages,
    })))
}

/// DELETE `/api/queues/{lane}/messages/{id}?receipt=` — remove a leased
/// message. 409 on a stale receipt, 404 on an unknown id.
pub async fn delete_message(
    State(state): State<AppState>,
    Path((lane, id)): Path<(QueueLane, String)>,
    Query(query): Query<DeleteMessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = query
        .receipt
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing receipt token"))?;

    state.queues.delete_message(lane, &id, &receipt).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/api/queues/{lane}/length` — best-effort count.
pub async fn queue_length(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
) -> Result<impl IntoResponse, AppError> {
    let length = state.queues.approximate_length(lane).await?;
    Ok(Json(json!({
        "queueName": lane.queue_name(),
        "approximateLength": length,
    })))
}

/// POST `/api/queues/{lane}/process` — receive one message and delete it
/// with the receipt just issued.
pub async fn process_message(
    State(state): State<AppState>,
    Path(lane): Path<QueueLane>,
) -> Result<impl IntoResponse, AppError> {
    let mut leased = state.queues.receive(lane, 1).await?;
    let Some(message) = leased.pop() else {
        return Ok(Json(json!({ "message": "No messages in queue" })));
    };

    info!("processing message from {}: {}", lane, message.message_text);
    state
        .queues
        .delete_message(lane, &message.message_id, &message.receipt)
        .await?;

    Ok(Json(json!({
        "message": "Message processed and deleted successfully",
        "messageId": message.message_id,
        "messageText": message.message_text,
    })))
}
