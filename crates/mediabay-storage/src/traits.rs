//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A successfully written object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub key: String,
    /// Public URL of the object
    pub url: String,
    pub len: u64,
}

/// Result of a bounded listing.
///
/// `truncated` is set when more objects matched the prefix than `max_keys`; the
/// remainder is never fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub keys: Vec<String>,
    pub truncated: bool,
}

impl Listing {
    /// Build a listing from up to `max_keys + 1` candidate keys.
    pub fn from_candidates(mut keys: Vec<String>, max_keys: usize) -> Self {
        let truncated = keys.len() > max_keys;
        keys.truncate(max_keys);
        Listing { keys, truncated }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3-compatible, local filesystem) implement this trait, so the
/// ingestion pipeline never couples to a specific provider.
///
/// Keys are opaque to the backend; see the crate root documentation for their layout.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `data` under `key` with the given Content-Type.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject>;

    /// Read an object back.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// List at most `max_keys` keys under `prefix`.
    ///
    /// Implementations fetch no more than `max_keys + 1` entries.
    async fn list(&self, prefix: &str, max_keys: usize) -> StorageResult<Listing>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Server-side copy within the same store. Returns the URL of the destination.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String>;

    /// Bucket (or root directory) this backend writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_truncates_extra_candidate() {
        let keys: Vec<String> = (0..301).map(|i| format!("feed/{:03}.jpg", i)).collect();
        let listing = Listing::from_candidates(keys, 300);

        assert_eq!(listing.keys.len(), 300);
        assert!(listing.truncated);
        assert_eq!(listing.keys.last().map(String::as_str), Some("feed/299.jpg"));
    }

    #[test]
    fn test_listing_exact_fit_is_not_truncated() {
        let keys: Vec<String> = (0..3).map(|i| format!("feed/{}.jpg", i)).collect();
        let listing = Listing::from_candidates(keys, 3);

        assert_eq!(listing.keys.len(), 3);
        assert!(!listing.truncated);
    }
}
