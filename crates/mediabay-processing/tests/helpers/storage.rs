//! Storage doubles: tempdir-backed stores and decorators that count or fail calls.

use async_trait::async_trait;
use bytes::Bytes;
use mediabay_core::StorageBackend;
use mediabay_storage::{
    Listing, LocalStorage, ObjectStorage, StorageError, StorageGateway, StorageResult,
    StoredObject,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Asset and video stores under one temporary directory.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub assets: Arc<LocalStorage>,
    pub videos: Arc<LocalStorage>,
}

impl TestStorage {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let assets = LocalStorage::new(
            temp_dir.path().join("assets"),
            "http://localhost:3000/media/assets".to_string(),
        )
        .await
        .expect("Failed to create asset storage");
        let videos = LocalStorage::new(
            temp_dir.path().join("videos"),
            "http://localhost:3000/media/videos".to_string(),
        )
        .await
        .expect("Failed to create video storage");

        Self {
            temp_dir,
            assets: Arc::new(assets),
            videos: Arc::new(videos),
        }
    }

    pub fn gateway(&self) -> StorageGateway {
        StorageGateway::new(self.assets.clone(), self.videos.clone())
    }

    /// Gateway whose asset store is `assets` instead of the local one.
    pub fn gateway_with_assets(&self, assets: Arc<dyn ObjectStorage>) -> StorageGateway {
        StorageGateway::new(assets, self.videos.clone())
    }
}

/// Records every call before delegating.
pub struct CountingStorage {
    inner: Arc<dyn ObjectStorage>,
    pub puts: Mutex<Vec<(String, String)>>,
    pub copies: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CountingStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>) -> Self {
        Self {
            inner,
            puts: Mutex::new(Vec::new()),
            copies: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    /// Content type recorded for `key`, if it was put.
    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl ObjectStorage for CountingStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> StorageResult<Listing> {
        self.inner.list(prefix, max_keys).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        self.copies.fetch_add(1, Ordering::SeqCst);
        self.inner.copy(from_key, to_key).await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Fails the configured operations, delegates the rest.
pub struct FailingStorage {
    inner: Arc<dyn ObjectStorage>,
    fail_puts: bool,
    fail_list: bool,
    failing_keys: HashSet<String>,
}

impl FailingStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>) -> Self {
        Self {
            inner,
            fail_puts: false,
            fail_list: false,
            failing_keys: HashSet::new(),
        }
    }

    pub fn failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Deletes of `key` and copies from `key` fail.
    pub fn failing_key(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }
}

#[async_trait]
impl ObjectStorage for FailingStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        if self.fail_puts {
            return Err(StorageError::UploadFailed("bucket unreachable".to_string()));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> StorageResult<Listing> {
        if self.fail_list {
            return Err(StorageError::ListFailed("access denied".to_string()));
        }
        self.inner.list(prefix, max_keys).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.failing_keys.contains(key) {
            return Err(StorageError::DeleteFailed(format!("{} is locked", key)));
        }
        self.inner.delete(key).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        if self.failing_keys.contains(from_key) {
            return Err(StorageError::CopyFailed(format!("{} is locked", from_key)));
        }
        self.inner.copy(from_key, to_key).await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
