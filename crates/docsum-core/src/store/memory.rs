//! In-memory object store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{DocsumError, DocsumResult, ErrorCode};
use crate::traits::ObjectStore;

/// Object store holding everything in a map. For tests and dry runs.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an object exists under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }
}

fn poisoned() -> DocsumError {
    DocsumError::Internal("object store lock poisoned".to_string())
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> DocsumResult<()> {
        self.objects
            .write()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> DocsumResult<Vec<u8>> {
        self.objects
            .read()
            .map_err(|_| poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| DocsumError::Storage {
                message: format!("object '{}' not found", key),
                code: ErrorCode::StoReadFailed,
                source: None,
            })
    }

    async fn delete(&self, key: &str) -> DocsumResult<()> {
        self.objects.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = InMemoryObjectStore::new();
        store.put("k", b"bytes", "text/plain").await.unwrap();
        assert!(store.contains("k"));
        assert_eq!(store.get("k").await.unwrap(), b"bytes");

        store.delete("k").await.unwrap();
        assert!(store.is_empty());
        assert_eq!(
            store.get("k").await.unwrap_err().code(),
            ErrorCode::StoReadFailed
        );
    }
}
