//! Shared helpers for service and router tests: an in-memory SQLite pool
//! seeded with the embedded schema, and a fully wired `AppState` over a
//! temporary storage directory.

use crate::services::AppState;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::{path::Path, sync::Arc};

/// One-connection in-memory pool; a second connection would see a different
/// empty database.
pub(crate) async fn test_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    crate::apply_schema(&pool).await.expect("schema applies");
    Arc::new(pool)
}

pub(crate) async fn test_state(storage_root: &Path) -> AppState {
    AppState::new(test_pool().await, storage_root)
}
