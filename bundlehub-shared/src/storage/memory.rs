//! In-memory storage backend for tests.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory object store backed by a HashMap.
///
/// Intended for tests; contents are lost on drop.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), data);
        Ok(())
    }

    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let mut objects = self.objects.write().expect("lock poisoned");
        if objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects
            .write()
            .expect("lock poisoned")
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryBackend::new();
        store.put("k", Bytes::from_static(b"v")).await.unwrap();
        assert_eq!(&store.get("k").await.unwrap()[..], b"v");
        assert!(store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_if_not_exists() {
        let store = MemoryBackend::new();
        store
            .put_if_not_exists("k", Bytes::from_static(b"one"))
            .await
            .unwrap();

        let err = store
            .put_if_not_exists("k", Bytes::from_static(b"two"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = MemoryBackend::new();
        assert!(matches!(
            store.get("nope").await.unwrap_err(),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            store.delete("nope").await.unwrap_err(),
            StorageError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryBackend::new();
        store.put("a/1", Bytes::from_static(b"")).await.unwrap();
        store.put("a/2", Bytes::from_static(b"")).await.unwrap();
        store.put("b/3", Bytes::from_static(b"")).await.unwrap();

        assert_eq!(store.list("a/").await.unwrap(), vec!["a/1", "a/2"]);
    }
}
