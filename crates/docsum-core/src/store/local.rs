//! Filesystem-backed object store.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::{DocsumError, DocsumResult, ErrorCode};
use crate::traits::ObjectStore;

/// Stores each object as a file under a root directory.
///
/// Keys are relative, `/`-separated paths. Keys that are absolute or
/// contain `..` are rejected.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at the given directory. The directory is
    /// created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> DocsumResult<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !valid {
            return Err(DocsumError::Storage {
                message: format!("invalid object key '{}'", key),
                code: ErrorCode::StoInvalidKey,
                source: None,
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> DocsumResult<()> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DocsumError::storage_with(
                    ErrorCode::StoWriteFailed,
                    format!("failed to create directory for '{}'", key),
                    e,
                )
            })?;
        }

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            DocsumError::storage_with(
                ErrorCode::StoWriteFailed,
                format!("failed to write '{}'", key),
                e,
            )
        })?;

        debug!(key, bytes = bytes.len(), content_type, "stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> DocsumResult<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            DocsumError::storage_with(
                ErrorCode::StoReadFailed,
                format!("failed to read '{}'", key),
                e,
            )
        })
    }

    async fn delete(&self, key: &str) -> DocsumResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocsumError::storage_with(
                ErrorCode::StoWriteFailed,
                format!("failed to delete '{}'", key),
                e,
            )),
        }
    }
}
