//! Queue lanes and message shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// The two fixed queue lanes.
///
/// Parsed from path segments as `order` / `inventory`; each maps to its
/// backing queue name.
#[derive(Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum QueueLane {
    Order,
    Inventory,
}

impl QueueLane {
    /// Backing queue name for this lane.
    pub fn queue_name(self) -> &'static str {
        match self {
            QueueLane::Order => "order-processing",
            QueueLane::Inventory => "inventory-management",
        }
    }
}

impl fmt::Display for QueueLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.queue_name())
    }
}

/// A message as seen by peek: visible content only, no lease data.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    /// Generated message id.
    pub message_id: String,

    /// Text payload.
    pub message_text: String,

    /// When the message was appended.
    pub inserted_on: DateTime<Utc>,

    /// How many times the message has been received.
    pub dequeue_count: i64,
}

/// A message held under a lease, as returned by receive.
///
/// The receipt is only valid until another receive leases the message again
/// or the lease expires; deleting with a stale receipt fails.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LeasedMessage {
    /// Generated message id.
    pub message_id: String,

    /// Text payload.
    pub message_text: String,

    /// When the message was appended.
    pub inserted_on: DateTime<Utc>,

    /// How many times the message has been received, this lease included.
    pub dequeue_count: i64,

    /// Receipt token required to delete this message.
    pub receipt: String,

    /// When the lease lapses and the message becomes visible again.
    pub next_visible_on: DateTime<Utc>,
}
