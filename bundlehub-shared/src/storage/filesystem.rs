//! Local filesystem storage backend.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Local filesystem object store.
///
/// Objects are plain files under a root directory; a key's slashes map to
/// subdirectories.
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend, creating the root if needed.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Get the full path for a key, with path traversal protection.
    ///
    /// Returns an error if the key would escape the storage root.
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }
        if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(format!(
                "path traversal not allowed: {key}"
            )));
        }

        for component in Path::new(key).components() {
            match component {
                std::path::Component::Normal(_) => {}
                _ => {
                    return Err(StorageError::InvalidKey(format!(
                        "contains unsafe path component: {key}"
                    )));
                }
            }
        }

        Ok(self.root.join(key))
    }

    /// Ensure parent directory exists.
    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FilesystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_path(key)?;
        fs::try_exists(&path).await.map_err(StorageError::Io)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self, data), fields(backend = "filesystem", len = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.key_path(key)?;
        self.ensure_parent(&path).await?;

        // Write to a temp file in the same directory, then rename for atomicity.
        let tmp = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StorageError::Io(e));
        }
        Ok(())
    }

    #[instrument(skip(self, data), fields(backend = "filesystem", len = data.len()))]
    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.key_path(key)?;
        self.ensure_parent(&path).await?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        file.write_all(&data).await?;
        file.sync_all().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    stack.push(path);
                    continue;
                }

                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative.to_string_lossy().replace('\\', "/");
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn health_check(&self) -> StorageResult<()> {
        if fs::try_exists(&self.root).await? {
            Ok(())
        } else {
            Err(StorageError::Config(format!(
                "storage root does not exist: {}",
                self.root.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn backend() -> (tempfile::TempDir, FilesystemBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path()).await.unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, backend) = backend().await;

        backend
            .put("apps/u/a/versions/file.zip", Bytes::from_static(b"bundle"))
            .await
            .unwrap();

        let data = backend.get("apps/u/a/versions/file.zip").await.unwrap();
        assert_eq!(&data[..], b"bundle");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, backend) = backend().await;

        backend.put("k", Bytes::from_static(b"one")).await.unwrap();
        backend.put("k", Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(&backend.get("k").await.unwrap()[..], b"two");
    }

    #[tokio::test]
    async fn test_put_if_not_exists_rejects_collision() {
        let (_dir, backend) = backend().await;

        backend
            .put_if_not_exists("k", Bytes::from_static(b"one"))
            .await
            .unwrap();

        let err = backend
            .put_if_not_exists("k", Bytes::from_static(b"two"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        // Original content untouched
        assert_eq!(&backend.get("k").await.unwrap()[..], b"one");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, backend) = backend().await;

        let err = backend.get("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let (_dir, backend) = backend().await;

        backend.put("k", Bytes::from_static(b"x")).await.unwrap();
        assert!(backend.exists("k").await.unwrap());

        backend.delete("k").await.unwrap();
        assert!(!backend.exists("k").await.unwrap());

        let err = backend.delete("k").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, backend) = backend().await;

        for key in ["../escape", "/abs", "a/../../b", ""] {
            let err = backend.get(key).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key: {key:?}");
        }
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let (_dir, backend) = backend().await;

        backend
            .put("apps/u/a/versions/1", Bytes::from_static(b"1"))
            .await
            .unwrap();
        backend
            .put("apps/u/a/versions/2", Bytes::from_static(b"2"))
            .await
            .unwrap();
        backend
            .put("apps/u/b/versions/3", Bytes::from_static(b"3"))
            .await
            .unwrap();

        let keys = backend.list("apps/u/a/versions").await.unwrap();
        assert_eq!(keys, vec!["apps/u/a/versions/1", "apps/u/a/versions/2"]);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_dir, backend) = backend().await;
        backend.health_check().await.unwrap();
    }
}
