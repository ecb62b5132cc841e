use crate::traits::{Listing, ObjectStorage, StorageError, StorageResult, StoredObject};
use crate::keys::{matches_prefix, parent_segment};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Content types are not persisted; the serving layer derives them from the extension.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    name: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/mediabay/assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let name = base_path.display().to_string();

        Ok(LocalStorage {
            base_path,
            base_url,
            name,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with path traversal sequences that could escape the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key
                .split(|c: char| c == '/' || c == '\\')
                .any(|segment| segment == "..")
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    pub fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// All keys under `root`, sorted. A missing directory has no keys.
    async fn walk_keys(&self, root: PathBuf) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let path = self.key_to_path(key)?;
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key: key.to_string(),
            url,
            len: size,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> StorageResult<Listing> {
        // Walk only the directory holding the last, possibly partial, segment
        let root = match parent_segment(prefix) {
            "" => self.base_path.clone(),
            parent => self.key_to_path(parent)?,
        };

        let keys: Vec<String> = self
            .walk_keys(root)
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
            .into_iter()
            .filter(|key| matches_prefix(key, prefix))
            .take(max_keys.saturating_add(1))
            .collect();

        Ok(Listing::from_candidates(keys, max_keys))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %key,
                    "Local storage delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        let from_path = self.key_to_path(from_key)?;
        let to_path = self.key_to_path(to_key)?;

        self.ensure_parent_dir(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(from_key.to_string())
            } else {
                StorageError::CopyFailed(format!(
                    "Failed to copy {} to {}: {}",
                    from_path.display(),
                    to_path.display(),
                    e
                ))
            }
        })?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            "Local storage copy successful"
        );

        Ok(self.generate_url(to_key))
    }

    fn bucket(&self) -> &str {
        &self.name
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = Bytes::from_static(b"test data");
        let stored = storage
            .put("feed/test.txt", data.clone(), "text/plain")
            .await
            .unwrap();

        assert_eq!(stored.key, "feed/test.txt");
        assert_eq!(stored.url, "http://localhost:3000/media/feed/test.txt");
        assert_eq!(stored.len, 9);

        let downloaded = storage.get("feed/test.txt").await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .put("/etc/passwd", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_nonexistent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.delete("nonexistent/file.txt").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_local_storage_copy() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = Bytes::from_static(b"original content");
        storage
            .put("before/original.txt", data.clone(), "text/plain")
            .await
            .unwrap();

        let url = storage
            .copy("before/original.txt", "after/copied.txt")
            .await
            .unwrap();

        assert!(url.ends_with("after/copied.txt"));
        assert_eq!(storage.get("after/copied.txt").await.unwrap(), data);
        assert_eq!(storage.get("before/original.txt").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_local_storage_copy_missing_source() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.copy("missing.txt", "copy.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dotted_file_name_is_not_traversal() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .put("docs/1/my..notes.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(
            storage.get("docs/1/my..notes.pdf").await.unwrap(),
            Bytes::from_static(b"%PDF")
        );

        let result = storage.get("docs/../../secret").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_list_matches_string_prefix() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        for key in ["feed/a.jpg", "feed/b.jpg", "feedback/c.jpg", "profile/d.jpg"] {
            storage
                .put(key, Bytes::from_static(b"x"), "image/jpeg")
                .await
                .unwrap();
        }

        let listing = storage.list("feed/", 10).await.unwrap();
        assert_eq!(listing.keys, vec!["feed/a.jpg", "feed/b.jpg"]);
        assert!(!listing.truncated);

        let listing = storage.list("feed", 10).await.unwrap();
        assert_eq!(listing.keys, vec!["feed/a.jpg", "feed/b.jpg", "feedback/c.jpg"]);

        let partial = storage.list("feed/a", 10).await.unwrap();
        assert_eq!(partial.keys, vec!["feed/a.jpg"]);

        let everything = storage.list("", 10).await.unwrap();
        assert_eq!(everything.keys.len(), 4);
    }

    #[tokio::test]
    async fn test_list_sets_truncated() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        for i in 0..5 {
            storage
                .put(&format!("feed/{}.jpg", i), Bytes::from_static(b"x"), "image/jpeg")
                .await
                .unwrap();
        }

        let listing = storage.list("feed/", 3).await.unwrap();
        assert_eq!(listing.keys, vec!["feed/0.jpg", "feed/1.jpg", "feed/2.jpg"]);
        assert!(listing.truncated);
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_empty() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let listing = storage.list("nothing/here", 10).await.unwrap();
        assert!(listing.keys.is_empty());
        assert!(!listing.truncated);
    }
}
