//! FileService — hierarchical file gateway for the `contracts` share, a
//! single-level directory under the storage root. Unlike the blob gateway
//! there are no metadata rows; listings and point queries come straight from
//! the filesystem.

use crate::errors::{StorageError, StorageResult};
use crate::models::file::ShareFileInfo;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Share every contract is stored in.
pub const SHARE_NAME: &str = "contracts";

/// FileService provides the file share operations:
/// - Upload under a name derived from the caller's file name plus a short
///   random suffix
/// - List the share's single-level directory
/// - Download, idempotent delete
/// - `exists` / `size_of` point queries for the pre-delete confirmation page
#[derive(Clone)]
pub struct FileService {
    base_path: PathBuf,
}

impl FileService {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn share_root(&self) -> PathBuf {
        self.base_path.join(SHARE_NAME)
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.share_root().join(name)
    }

    fn ensure_name_safe(name: &str) -> StorageResult<()> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.bytes().any(|b| b.is_ascii_control())
        {
            return Err(StorageError::BadInput(format!("invalid file name `{name}`")));
        }
        Ok(())
    }

    /// Upload a payload, deriving the stored name from the original one.
    ///
    /// The suffix is only eight random hex characters, so name collisions are
    /// possible in principle and are not detected — a later upload with the
    /// same derived name would replace the earlier file.
    pub async fn upload(
        &self,
        original_name: Option<&str>,
        bytes: Bytes,
    ) -> StorageResult<ShareFileInfo> {
        if bytes.is_empty() {
            return Err(StorageError::BadInput("file is empty".into()));
        }

        let name = derive_name(original_name);
        Self::ensure_name_safe(&name)?;

        let root = self.share_root();
        fs::create_dir_all(&root).await?;

        let file_path = self.file_path(&name);
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

        debug!("file {} uploaded ({} bytes)", name, bytes.len());
        Ok(ShareFileInfo {
            name,
            size_bytes: bytes.len() as u64,
        })
    }

    /// Every regular file in the share with its size. Temporary files from
    /// in-flight uploads (dot-prefixed) are skipped.
    pub async fn list(&self) -> StorageResult<Vec<ShareFileInfo>> {
        let root = self.share_root();
        let mut files = Vec::new();
        let mut entries = match fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(files),
            Err(err) => return Err(StorageError::Io(err)),
        };
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            files.push(ShareFileInfo {
                name,
                size_bytes: meta.len(),
            });
        }
        Ok(files)
    }

    /// Fetch a file for reading: its size and an opened handle.
    pub async fn download(&self, name: &str) -> StorageResult<(u64, File)> {
        Self::ensure_name_safe(name)?;
        let path = self.file_path(name);
        let file = File::open(&path).await.map_err(|err| not_found(err, name))?;
        let size = file.metadata().await?.len();
        Ok((size, file))
    }

    /// Whether the named file exists in the share.
    pub async fn exists(&self, name: &str) -> StorageResult<bool> {
        Self::ensure_name_safe(name)?;
        match fs::metadata(self.file_path(name)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Size of the named file. NotFound when absent.
    pub async fn size_of(&self, name: &str) -> StorageResult<u64> {
        Self::ensure_name_safe(name)?;
        let meta = fs::metadata(self.file_path(name))
            .await
            .map_err(|err| not_found(err, name))?;
        Ok(meta.len())
    }

    /// Delete a file. Idempotent: an absent name is a silent success.
    pub async fn delete(&self, name: &str) -> StorageResult<()> {
        Self::ensure_name_safe(name)?;
        match fs::remove_file(self.file_path(name)).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file {} already absent on delete", name);
                Ok(())
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

fn not_found(err: io::Error, name: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}

/// Derive the stored name: `<stem>_<8 hex chars><ext>` from the original
/// name, or `contract_<uuid>.pdf` when the caller supplied none.
fn derive_name(original_name: Option<&str>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    match original_name {
        Some(original) if !original.is_empty() => {
            let path = Path::new(original);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "contract".to_string());
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            format!("{stem}_{}{ext}", &suffix[..8])
        }
        _ => format!("contract_{suffix}.pdf"),
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
    use tokio::io::AsyncReadExt;

    fn service() -> (FileService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (FileService::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn upload_derives_name_from_original() {
        let (service, _dir) = service();
        let info = service
            .upload(Some("lease-agreement.pdf"), Bytes::from_static(b"contract"))
            .await
            .unwrap();

        assert!(info.name.starts_with("lease-agreement_"));
        assert!(info.name.ends_with(".pdf"));
        // stem + underscore + 8-char suffix + extension
        assert_eq!(info.name.len(), "lease-agreement_".len() + 8 + ".pdf".len());
        assert_eq!(info.size_bytes, 8);
    }

    #[tokio::test]
    async fn upload_without_name_falls_back_to_contract_pdf() {
        let (service, _dir) = service();
        let info = service.upload(None, Bytes::from_static(b"x")).await.unwrap();
        assert!(info.name.starts_with("contract_"));
        assert!(info.name.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn download_roundtrip_and_point_queries() {
        let (service, _dir) = service();
        let payload = Bytes::from_static(b"signed contract body");
        let info = service.upload(Some("deal.txt"), payload.clone()).await.unwrap();

        assert!(service.exists(&info.name).await.unwrap());
        assert_eq!(service.size_of(&info.name).await.unwrap(), payload.len() as u64);

        let (size, mut file) = service.download(&info.name).await.unwrap();
        assert_eq!(size, payload.len() as u64);
        let mut read_back = Vec::new();
        file.read_to_end(&mut read_back).await.unwrap();
        assert_eq!(read_back, payload);

        let listed = service.list().await.unwrap();
        assert!(listed.iter().any(|f| f.name == info.name));
    }

    #[tokio::test]
    async fn delete_then_queries_report_absence() {
        let (service, _dir) = service();
        let info = service.upload(Some("gone.pdf"), Bytes::from_static(b"x")).await.unwrap();

        service.delete(&info.name).await.unwrap();
        assert!(!service.exists(&info.name).await.unwrap());
        assert!(matches!(
            service.size_of(&info.name).await.unwrap_err(),
            StorageError::FileNotFound(_)
        ));
        assert!(matches!(
            service.download(&info.name).await.unwrap_err(),
            StorageError::FileNotFound(_)
        ));
        // Idempotent.
        service.delete(&info.name).await.unwrap();
    }

    #[tokio::test]
    async fn empty_upload_and_traversal_names_are_rejected() {
        let (service, _dir) = service();
        assert!(matches!(
            service.upload(Some("a.pdf"), Bytes::new()).await.unwrap_err(),
            StorageError::BadInput(_)
        ));
        assert!(matches!(
            service.download("../../secrets").await.unwrap_err(),
            StorageError::BadInput(_)
        ));
    }

    #[tokio::test]
    async fn list_on_missing_share_is_empty() {
        let (service, _dir) = service();
        assert!(service.list().await.unwrap().is_empty());
    }
}
