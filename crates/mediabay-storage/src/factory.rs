#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{
    BoundedStorage, ObjectStorage, StorageBackend, StorageError, StorageGateway, StorageResult,
};
use mediabay_core::{AssetClass, Config};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Create the backend for one asset class based on configuration
pub async fn create_storage(
    config: &Config,
    class: AssetClass,
) -> StorageResult<Arc<dyn ObjectStorage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let (store, var) = match class {
                AssetClass::Asset => (config.asset_store.as_ref(), "ASSET_STORE_BUCKET"),
                AssetClass::Video => (config.video_store.as_ref(), "VIDEO_STORE_BUCKET"),
            };
            let store = store
                .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", var)))?;

            let storage = S3Storage::new(store)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.as_deref().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.as_deref().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let subdir = match class {
                AssetClass::Asset => "assets",
                AssetClass::Video => "videos",
            };
            let storage = LocalStorage::new(
                std::path::Path::new(base_path).join(subdir),
                format!("{}/{}", base_url.trim_end_matches('/'), subdir),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Build both stores, sharing one limiter for outbound operations.
pub async fn create_storage_gateway(config: &Config) -> StorageResult<StorageGateway> {
    let permits = Arc::new(Semaphore::new(config.processing.max_concurrent_storage_ops.max(1)));

    let assets = create_storage(config, AssetClass::Asset).await?;
    let videos = create_storage(config, AssetClass::Video).await?;

    tracing::info!(
        backend = %config.storage_backend,
        asset_bucket = %assets.bucket(),
        video_bucket = %videos.bucket(),
        max_concurrent_ops = config.processing.max_concurrent_storage_ops,
        "Storage gateway initialized"
    );

    Ok(StorageGateway::new(
        Arc::new(BoundedStorage::new(assets, permits.clone())),
        Arc::new(BoundedStorage::new(videos, permits)),
    ))
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::tempdir;

    fn local_config(path: &std::path::Path) -> Config {
        let path = path.display().to_string();
        Config::from_lookup(move |key| match key {
            "STORAGE_BACKEND" => Some("local".to_string()),
            "LOCAL_STORAGE_PATH" => Some(path.clone()),
            "LOCAL_STORAGE_BASE_URL" => Some("http://localhost:3000/media/".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_gateway_routes_by_class() {
        let dir = tempdir().unwrap();
        let gateway = create_storage_gateway(&local_config(dir.path()))
            .await
            .unwrap();

        let stored = gateway
            .for_class(AssetClass::Video)
            .put("clips/a.mp4", Bytes::from_static(b"video"), "video/mp4")
            .await
            .unwrap();

        assert_eq!(stored.url, "http://localhost:3000/media/videos/clips/a.mp4");
        assert!(dir.path().join("videos/clips/a.mp4").exists());
        assert!(gateway.assets().list("clips", 10).await.unwrap().keys.is_empty());
        assert_eq!(gateway.videos().list("clips", 10).await.unwrap().keys.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_bucket_is_config_error() {
        let config = Config::from_lookup(|_| None).unwrap();
        let result = create_storage(&config, AssetClass::Asset).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
