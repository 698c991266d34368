//! Object storage trait.

use async_trait::async_trait;

use crate::error::DocsumResult;

/// Blob storage for original upload bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, replacing any existing object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> DocsumResult<()>;

    /// Fetch the bytes stored under a key.
    async fn get(&self, key: &str) -> DocsumResult<Vec<u8>>;

    /// Remove an object. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> DocsumResult<()>;
}
