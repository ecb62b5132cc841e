//! Mediabay Core Library
//!
//! This crate provides the error taxonomy, configuration and shared enums used by the
//! storage, processing and CLI crates.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ProcessingConfig, StoreConfig};
pub use error::{BatchFailureCode, BoxError, ErrorCategory, ErrorMetadata, LogLevel, MediaError};
pub use storage_types::{AssetClass, StorageBackend};
