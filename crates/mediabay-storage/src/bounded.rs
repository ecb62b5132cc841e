//! Concurrency cap for outbound storage calls.

use crate::traits::{Listing, ObjectStorage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Wraps a backend so that at most N operations are in flight at once.
///
/// Several wrappers may share one semaphore, which caps the combined traffic of both
/// stores behind a [`crate::StorageGateway`].
#[derive(Clone)]
pub struct BoundedStorage {
    inner: Arc<dyn ObjectStorage>,
    permits: Arc<Semaphore>,
}

impl BoundedStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>, permits: Arc<Semaphore>) -> Self {
        Self { inner, permits }
    }

    async fn acquire(&self) -> StorageResult<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|e| StorageError::BackendError(format!("Storage limiter closed: {}", e)))
    }
}

#[async_trait]
impl ObjectStorage for BoundedStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let _permit = self.acquire().await?;
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let _permit = self.acquire().await?;
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str, max_keys: usize) -> StorageResult<Listing> {
        let _permit = self.acquire().await?;
        self.inner.list(prefix, max_keys).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let _permit = self.acquire().await?;
        self.inner.delete(key).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        let _permit = self.acquire().await?;
        self.inner.copy(from_key, to_key).await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
