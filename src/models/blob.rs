//! Metadata for objects in the `product-images` blob container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for one stored blob. Payload bytes live on disk; this row is the
/// durable record in SQLite.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    /// Generated blob name (uuid + original extension), unique in the
    /// container.
    pub name: String,

    /// Content type supplied at upload.
    pub content_type: String,

    /// Payload size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: String,

    /// When the blob was uploaded.
    pub created_at: DateTime<Utc>,

    /// Retrieval address, filled in by the gateway (not a table column).
    #[sqlx(default)]
    #[serde(default)]
    pub url: String,
}
