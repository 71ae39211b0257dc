//! BlobService — object store gateway for the `product-images` container.
//! Payload bytes live on disk under `base_path/product-images/{name}`;
//! durable metadata (content type, size, etag, creation time) lives in
//! SQLite.

use crate::errors::{StorageError, StorageResult};
use crate::models::blob::BlobRecord;
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Container every product image is stored in.
pub const CONTAINER_NAME: &str = "product-images";

/// Retrieval address for a stored blob.
pub fn blob_url(name: &str) -> String {
    format!("/api/images/{name}")
}

/// BlobService provides the object store operations:
/// - Upload (fresh unique name, payload to disk, metadata row in SQLite)
/// - List every blob with its metadata
/// - Download (metadata plus an opened file handle for streaming)
/// - Idempotent delete
#[derive(Clone)]
pub struct BlobService {
    db: Arc<SqlitePool>,
    base_path: PathBuf,
}

impl BlobService {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
        }
    }

    fn container_root(&self) -> PathBuf {
        self.base_path.join(CONTAINER_NAME)
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.container_root().join(name)
    }

    /// Basic name validation to avoid trivial path traversal vectors. Blob
    /// names are flat; separators and dot-dot are rejected outright.
    fn ensure_name_safe(name: &str) -> StorageResult<()> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.bytes().any(|b| b.is_ascii_control())
        {
            return Err(StorageError::BadInput(format!("invalid blob name `{name}`")));
        }
        Ok(())
    }

    /// Upload a payload under a freshly generated name.
    ///
    /// Writes bytes to a temporary file, fsyncs, renames into place, then
    /// inserts the metadata row. The payload is removed again if the insert
    /// fails. Empty payloads are rejected before any storage call.
    pub async fn upload(
        &self,
        bytes: Bytes,
        content_type: &str,
        extension: Option<&str>,
    ) -> StorageResult<BlobRecord> {
        if bytes.is_empty() {
            return Err(StorageError::BadInput("file is empty".into()));
        }

        let ext = normalize_extension(extension);
        let name = format!("{}{}", Uuid::new_v4(), ext);
        Self::ensure_name_safe(&name)?;

        let root = self.container_root();
        fs::create_dir_all(&root).await?;

        let file_path = self.blob_path(&name);
        let tmp_path = root.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = write_all_synced(&mut file, &bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        let record = BlobRecord {
            url: blob_url(&name),
            name,
            content_type: content_type.to_string(),
            size_bytes: bytes.len() as i64,
            etag: format!("{:x}", md5::compute(&bytes)),
            created_at: Utc::now(),
        };

        let insert = sqlx::query(
            "INSERT INTO blobs (name, content_type, size_bytes, etag, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.content_type)
        .bind(record.size_bytes)
        .bind(&record.etag)
        .bind(record.created_at)
        .execute(&*self.db)
        .await;

        if let Err(err) = insert {
            let _ = fs::remove_file(&file_path).await;
            return Err(StorageError::Sqlx(err));
        }

        debug!("blob {} uploaded ({} bytes)", record.name, record.size_bytes);
        Ok(record)
    }

    /// Every stored blob with its metadata and retrieval address.
    pub async fn list(&self) -> StorageResult<Vec<BlobRecord>> {
        let mut blobs = sqlx::query_as::<_, BlobRecord>(
            "SELECT name, content_type, size_bytes, etag, created_at FROM blobs",
        )
        .fetch_all(&*self.db)
        .await?;
        for blob in &mut blobs {
            blob.url = blob_url(&blob.name);
        }
        Ok(blobs)
    }

    /// Fetch only blob metadata. NotFound when the name is absent.
    pub async fn metadata(&self, name: &str) -> StorageResult<BlobRecord> {
        Self::ensure_name_safe(name)?;
        let mut record = sqlx::query_as::<_, BlobRecord>(
            "SELECT name, content_type, size_bytes, etag, created_at FROM blobs WHERE name = ?",
        )
        .bind(name)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StorageError::BlobNotFound(name.to_string()),
            other => StorageError::Sqlx(other),
        })?;
        record.url = blob_url(&record.name);
        Ok(record)
    }

    /// Fetch a blob for reading: metadata and an opened file handle.
    ///
    /// NotFound also covers the case where the metadata row exists but the
    /// physical payload is missing.
    pub async fn download(&self, name: &str) -> StorageResult<(BlobRecord, File)> {
        let record = self.metadata(name).await?;
        let file = File::open(self.blob_path(name)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::BlobNotFound(name.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;
        Ok((record, file))
    }

    /// Delete a blob. Idempotent: an absent name is a silent success; the
    /// payload file is removed best-effort.
    pub async fn delete(&self, name: &str) -> StorageResult<()> {
        Self::ensure_name_safe(name)?;
        let result = sqlx::query("DELETE FROM blobs WHERE name = ?")
            .bind(name)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            debug!("blob {} already absent on delete", name);
        }

        match fs::remove_file(self.blob_path(name)).await {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(StorageError::Io(err)),
        }
        Ok(())
    }
}

/// Normalize a caller-supplied extension to `.ext` form; defaults to `.jpg`
/// when absent, matching the upload surface's image default.
fn normalize_extension(extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => {
            if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{ext}")
            }
        }
        _ => ".jpg".to_string(),
    }
}

async fn write_all_synced(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;
    use tokio::io::AsyncReadExt;

    async fn service() -> (BlobService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let service = BlobService::new(test_pool().await, dir.path());
        (service, dir)
    }

    #[tokio::test]
    async fn upload_then_download_is_byte_identical() {
        let (service, _dir) = service().await;
        let payload = Bytes::from_static(b"\x89PNG fake image bytes");

        let record = service
            .upload(payload.clone(), "image/png", Some(".png"))
            .await
            .unwrap();
        assert!(record.name.ends_with(".png"));
        assert_eq!(record.size_bytes, payload.len() as i64);
        assert_eq!(record.url, format!("/api/images/{}", record.name));

        let (meta, mut file) = service.download(&record.name).await.unwrap();
        assert_eq!(meta.content_type, "image/png");
        let mut read_back = Vec::new();
        file.read_to_end(&mut read_back).await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let (service, _dir) = service().await;
        let err = service
            .upload(Bytes::new(), "image/jpeg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadInput(_)));
    }

    #[tokio::test]
    async fn list_contains_uploaded_blobs() {
        let (service, _dir) = service().await;
        let a = service
            .upload(Bytes::from_static(b"a"), "image/jpeg", None)
            .await
            .unwrap();
        let b = service
            .upload(Bytes::from_static(b"b"), "image/gif", Some("gif"))
            .await
            .unwrap();

        let listed = service.list().await.unwrap();
        assert!(listed.iter().any(|r| r.name == a.name));
        assert!(listed.iter().any(|r| r.name == b.name && r.content_type == "image/gif"));
    }

    #[tokio::test]
    async fn delete_makes_download_not_found_and_is_idempotent() {
        let (service, _dir) = service().await;
        let record = service
            .upload(Bytes::from_static(b"bytes"), "image/jpeg", None)
            .await
            .unwrap();

        service.delete(&record.name).await.unwrap();
        let err = service.download(&record.name).await.unwrap_err();
        assert!(matches!(err, StorageError::BlobNotFound(_)));

        // Deleting again is a silent success.
        service.delete(&record.name).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let (service, _dir) = service().await;
        let err = service.download("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::BadInput(_)));
    }
}
