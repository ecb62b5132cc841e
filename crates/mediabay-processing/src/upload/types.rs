//! Types for the ingestion operations.

use bytes::Bytes;
use mediabay_storage::StorageObjectKey;
use serde::Serialize;

/// One uploaded payload, as received.
///
/// The file name is client-supplied and untrusted; it only feeds logging and the
/// generic-file key.
#[derive(Debug, Clone)]
pub struct RawAsset {
    file_name: String,
    data: Bytes,
    declared_size: u64,
}

impl RawAsset {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            file_name: file_name.into(),
            declared_size: data.len() as u64,
            data,
        }
    }

    /// Override the size reported by the transport (e.g. multipart `Content-Length`).
    pub fn with_declared_size(mut self, declared_size: u64) -> Self {
        self.declared_size = declared_size;
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn declared_size(&self) -> u64 {
        self.declared_size
    }
}

/// Stored video plus its thumbnail.
#[derive(Debug, Clone, Serialize)]
pub struct VideoUpload {
    pub url: String,
    pub thumbnail: String,
    pub duration_seconds: f64,
    pub video_key: StorageObjectKey,
    pub thumbnail_key: StorageObjectKey,
}

/// Outcome of a best-effort removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalSummary {
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl RemovalSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CopySkipReason {
    /// One of the key lists was empty
    Empty,
    LengthMismatch { previous: usize, next: usize },
}

/// Result of a pairwise copy. Copies are never reported as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CopyOutcome {
    Copied { count: usize },
    /// Nothing was attempted
    Skipped(CopySkipReason),
    /// The first `copied` pairs succeeded; the pair starting at `failed_key` did not and
    /// nothing after it was attempted
    Aborted {
        copied: usize,
        failed_key: String,
        reason: String,
    },
}
