//! File storage sink for uploaded complaint images.
//!
//! Callers get back a relative path; how and where bytes live is up to the
//! implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under `directory` with a generated name ending in
    /// `.{extension}`. Returns the path relative to the storage root.
    async fn put(&self, directory: &str, extension: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// Remove a previously stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> AppResult<()>;
}

/// Stores files on the local disk below a root directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn put(&self, directory: &str, extension: &str, bytes: Vec<u8>) -> AppResult<String> {
        let dir = self.root.join(directory);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create {}: {}", dir.display(), e)))?;

        let relative = format!("{}/{}.{}", directory, Uuid::new_v4(), extension);
        let target = self.root.join(&relative);

        fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::internal(format!("Failed to write {}: {}", target.display(), e)))?;

        tracing::debug!(path = %relative, "Stored upload");
        Ok(relative)
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        match fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!("Failed to remove {}: {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_removes_under_root() {
        let root = std::env::temp_dir().join(format!("posyandu-storage-{}", Uuid::new_v4()));
        let storage = LocalStorage::new(&root);

        let path = storage.put("pengaduan", "png", vec![1, 2, 3]).await.unwrap();
        assert!(path.starts_with("pengaduan/"));
        assert!(path.ends_with(".png"));
        assert_eq!(fs::read(root.join(&path)).await.unwrap(), vec![1, 2, 3]);

        storage.remove(&path).await.unwrap();
        storage.remove(&path).await.unwrap();
        assert!(!root.join(&path).exists());

        let _ = fs::remove_dir_all(root).await;
    }
}
