//! Storage gateways. Each one wraps a single backing primitive (partitioned
//! tables, blob container, file share, queue lanes) behind a small typed
//! surface; the HTTP layer orchestrates them per request.

pub mod blob_service;
pub mod file_service;
pub mod queue_service;
pub mod table_service;

use blob_service::BlobService;
use file_service::FileService;
use queue_service::QueueService;
use sqlx::SqlitePool;
use std::{path::PathBuf, sync::Arc};
use table_service::TableService;

/// Shared handles passed to every handler: one long-lived client per gateway,
/// built once at startup from the configuration.
#[derive(Clone)]
pub struct AppState {
    /// SQLite pool, kept for readiness probes.
    pub db: Arc<SqlitePool>,

    /// Root directory for blob and share payloads, kept for readiness probes.
    pub storage_root: PathBuf,

    pub tables: TableService,
    pub blobs: BlobService,
    pub files: FileService,
    pub queues: QueueService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, storage_root: impl Into<PathBuf>) -> Self {
        let storage_root = storage_root.into();
        Self {
            tables: TableService::new(db.clone()),
            blobs: BlobService::new(db.clone(), storage_root.clone()),
            files: FileService::new(storage_root.clone()),
            queues: QueueService::new(db.clone()),
            db,
            storage_root,
        }
    }
}

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
