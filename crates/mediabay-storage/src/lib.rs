//! Mediabay Storage Library
//!
//! This crate provides the object storage abstraction used by the ingestion pipeline,
//! with implementations for S3-compatible stores and the local filesystem.
//!
//! # Storage key format
//!
//! Keys are folder-scoped and collision-free by construction:
//!
//! - **Normalized images and videos**: `{folder}/{uuid}.{ext}`
//! - **Generic files**: `{folder}/{uuid}/{file_name}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod bounded;
pub mod factory;
pub mod gateway;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use bounded::BoundedStorage;
pub use factory::{create_storage, create_storage_gateway};
pub use gateway::StorageGateway;
pub use keys::StorageObjectKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediabay_core::{AssetClass, StorageBackend};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Listing, ObjectStorage, StorageError, StorageResult, StoredObject};
