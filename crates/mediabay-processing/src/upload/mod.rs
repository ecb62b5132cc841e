//! Batch operations against object storage.

pub mod ingestor;
pub mod types;

pub use ingestor::{MediaIngestor, LIST_MAX_KEYS};
pub use types::{CopyOutcome, CopySkipReason, RawAsset, RemovalSummary, VideoUpload};
