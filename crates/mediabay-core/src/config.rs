//! Configuration module
//!
//! Storage endpoints, credentials and processing limits are read once at startup and
//! treated as immutable afterwards. Values come from the environment (with `.env`
//! support); every lookup goes through [`Config::from_lookup`] so tests can supply a map.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const MAX_FILE_SIZE_MB: u64 = 10;
const MAX_CONCURRENT_VIDEO_DECODES: usize = 2;
const MAX_CONCURRENT_STORAGE_OPS: usize = 8;
const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for one S3-compatible object store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (NCP Object Storage, MinIO, ...)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl StoreConfig {
    /// Read `{prefix}_BUCKET`, `{prefix}_REGION`, `{prefix}_ENDPOINT`,
    /// `{prefix}_ACCESS_KEY_ID` and `{prefix}_SECRET_ACCESS_KEY`.
    ///
    /// Returns `None` when no bucket is configured.
    pub fn from_lookup<F>(prefix: &str, lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", prefix, name)).filter(|v| !v.is_empty());

        let bucket = var("BUCKET")?;
        Some(StoreConfig {
            bucket,
            region: var("REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: var("ENDPOINT"),
            access_key_id: var("ACCESS_KEY_ID"),
            secret_access_key: var("SECRET_ACCESS_KEY"),
        })
    }
}

/// Limits and external tools used by the ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Per-file ceiling for the generic-file upload path
    pub max_file_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_concurrent_video_decodes: usize,
    pub max_concurrent_storage_ops: usize,
    /// Deadline around decode + upload of a single item. `None` disables it.
    pub item_deadline: Option<Duration>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            max_concurrent_video_decodes: MAX_CONCURRENT_VIDEO_DECODES,
            max_concurrent_storage_ops: MAX_CONCURRENT_STORAGE_OPS,
            item_deadline: None,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub storage_backend: StorageBackend,
    /// Primary store for images and generic files
    pub asset_store: Option<StoreConfig>,
    /// Secondary store for videos and their thumbnails
    pub video_store: Option<StoreConfig>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub processing: ProcessingConfig,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let max_file_size_mb: u64 = parse_number(&lookup, "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;
        let item_deadline_secs: u64 = parse_number(&lookup, "ITEM_DEADLINE_SECS", 0)?;

        let processing = ProcessingConfig {
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            max_concurrent_video_decodes: parse_number(
                &lookup,
                "MAX_CONCURRENT_VIDEO_DECODES",
                MAX_CONCURRENT_VIDEO_DECODES,
            )?,
            max_concurrent_storage_ops: parse_number(
                &lookup,
                "MAX_CONCURRENT_STORAGE_OPS",
                MAX_CONCURRENT_STORAGE_OPS,
            )?,
            item_deadline: (item_deadline_secs > 0)
                .then(|| Duration::from_secs(item_deadline_secs)),
        };

        Ok(Config {
            environment,
            storage_backend,
            asset_store: StoreConfig::from_lookup("ASSET_STORE", &lookup),
            video_store: StoreConfig::from_lookup("VIDEO_STORE", &lookup),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            processing,
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.asset_store.is_none() {
                    return Err(anyhow::anyhow!(
                        "ASSET_STORE_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.video_store.is_none() {
                    return Err(anyhow::anyhow!(
                        "VIDEO_STORE_BUCKET must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.processing.max_concurrent_video_decodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_VIDEO_DECODES must be greater than 0"
            ));
        }
        if self.processing.max_concurrent_storage_ops == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_STORAGE_OPS must be greater than 0"
            ));
        }

        Ok(())
    }
}

/// Parse a numeric variable, falling back to `default` only when it is unset.
fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
