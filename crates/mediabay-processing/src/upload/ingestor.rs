//! Batch orchestration: sniff → normalize → store, one item at a time.

use bytes::Bytes;
use mediabay_core::{AssetClass, BatchFailureCode, MediaError, ProcessingConfig};
use mediabay_storage::{Listing, StorageGateway, StorageObjectKey};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use super::types::{CopyOutcome, CopySkipReason, RawAsset, RemovalSummary, VideoUpload};
use crate::compression::ImageCompressor;
use crate::image::ImageNormalizer;
use crate::policy::NormalizationPolicy;
use crate::sniff::{AssetKind, DetectedFormat};
use crate::validator::{sanitize_filename, sanitized_stem, FileValidator};
use crate::video::{FfmpegFrameExtractor, FrameExtractor};

/// Upper bound on keys returned by [`MediaIngestor::list_images`]
pub const LIST_MAX_KEYS: usize = 300;

/// Entry point for every ingestion operation.
///
/// Items in a batch are processed sequentially and batches are fail-fast: the first item
/// failure aborts the batch and no keys are returned. Objects already written by earlier
/// items of a failed batch stay in storage.
#[derive(Clone)]
pub struct MediaIngestor {
    storage: StorageGateway,
    extractor: Arc<dyn FrameExtractor>,
    validator: FileValidator,
    item_deadline: Option<Duration>,
}

impl MediaIngestor {
    pub fn new(
        storage: StorageGateway,
        extractor: Arc<dyn FrameExtractor>,
        config: &ProcessingConfig,
    ) -> Self {
        Self {
            storage,
            extractor,
            validator: FileValidator::new(config.max_file_size_bytes),
            item_deadline: config.item_deadline,
        }
    }

    /// Ingestor backed by the FFmpeg extractor
    pub fn from_config(storage: StorageGateway, config: &ProcessingConfig) -> Self {
        let extractor = Arc::new(FfmpegFrameExtractor::from_config(config));
        Self::new(storage, extractor, config)
    }

    /// Standard image batch: longer edge ≤ 2048, tiered quality. Failures carry S3-002.
    pub async fn upload_images(
        &self,
        files: Vec<RawAsset>,
        folder: &str,
    ) -> Result<Vec<StorageObjectKey>, MediaError> {
        self.upload_images_with(files, folder, NormalizationPolicy::standard())
            .await
    }

    /// Origin image batch: shrunk only above 12 MP, inverse-ratio quality. Failures
    /// carry S3-005.
    pub async fn upload_images_origin(
        &self,
        files: Vec<RawAsset>,
        folder: &str,
    ) -> Result<Vec<StorageObjectKey>, MediaError> {
        self.upload_images_with(files, folder, NormalizationPolicy::origin())
            .await
    }

    #[tracing::instrument(skip_all, fields(folder = %folder, count = files.len()))]
    pub async fn upload_images_with(
        &self,
        files: Vec<RawAsset>,
        folder: &str,
        policy: NormalizationPolicy,
    ) -> Result<Vec<StorageObjectKey>, MediaError> {
        if files.is_empty() {
            return Err(MediaError::EmptyBatch);
        }

        let mut keys = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let file_name = file.file_name().to_string();
            let key = self
                .with_deadline(self.ingest_image(file, folder, policy))
                .await
                .map_err(|e| batch_failure(policy.failure_code, index, file_name, e))?;
            keys.push(key);
        }

        tracing::info!(uploaded = keys.len(), "Image batch stored");
        Ok(keys)
    }

    /// Generic files: GIF/JPEG/PNG by content, or PDF by name. 10 MiB ceiling by default.
    /// Failures carry S3-005.
    #[tracing::instrument(skip_all, fields(folder = %folder, count = files.len()))]
    pub async fn upload_files(
        &self,
        files: Vec<RawAsset>,
        folder: &str,
    ) -> Result<Vec<StorageObjectKey>, MediaError> {
        if files.is_empty() {
            return Err(MediaError::EmptyBatch);
        }

        let mut keys = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let file_name = file.file_name().to_string();
            let key = self
                .with_deadline(self.ingest_file(file, folder))
                .await
                .map_err(|e| batch_failure(BatchFailureCode::Preprocess, index, file_name, e))?;
            keys.push(key);
        }

        tracing::info!(uploaded = keys.len(), "File batch stored");
        Ok(keys)
    }

    /// Store a video and a PNG of its first frame side by side in the video store.
    #[tracing::instrument(skip_all, fields(folder = %folder, file_name = %file.file_name()))]
    pub async fn upload_video(
        &self,
        folder: &str,
        file: RawAsset,
    ) -> Result<VideoUpload, MediaError> {
        let format = DetectedFormat::sniff(file.data());
        if format.kind != AssetKind::Video {
            return Err(MediaError::DisallowedFormat {
                extension: format.extension.map(String::from),
                content_type: format.mime.map(String::from),
            });
        }

        self.with_deadline(self.ingest_video(folder, file, format))
            .await
    }

    /// At most [`LIST_MAX_KEYS`] keys under `prefix` in the asset store.
    pub async fn list_images(&self, prefix: &str) -> Result<Listing, MediaError> {
        let listing = self
            .storage
            .for_class(AssetClass::Asset)
            .list(prefix, LIST_MAX_KEYS)
            .await
            .map_err(|e| MediaError::upload(prefix, e))?;

        if listing.truncated {
            tracing::warn!(
                prefix = %prefix,
                max_keys = LIST_MAX_KEYS,
                "Listing truncated"
            );
        }

        Ok(listing)
    }

    /// Delete every key, continuing past failures.
    pub async fn remove_images(&self, keys: &[String]) -> RemovalSummary {
        let store = self.storage.for_class(AssetClass::Asset);
        let mut summary = RemovalSummary::default();

        for key in keys {
            match store.delete(key).await {
                Ok(()) => summary.removed.push(key.clone()),
                Err(e) => {
                    tracing::error!(error = %e, key = %key, "Failed to remove image");
                    summary.failed.push(key.clone());
                }
            }
        }

        summary
    }

    /// Copy `previous[i]` to `next[i]` for every i, stopping at the first failure.
    ///
    /// Both lists must be non-empty and of equal length; otherwise nothing is copied.
    pub async fn copy_images(&self, previous: &[String], next: &[String]) -> CopyOutcome {
        if previous.is_empty() || next.is_empty() {
            tracing::debug!("Copy skipped: empty key list");
            return CopyOutcome::Skipped(CopySkipReason::Empty);
        }
        if previous.len() != next.len() {
            tracing::warn!(
                previous = previous.len(),
                next = next.len(),
                "Copy skipped: key lists differ in length"
            );
            return CopyOutcome::Skipped(CopySkipReason::LengthMismatch {
                previous: previous.len(),
                next: next.len(),
            });
        }

        let store = self.storage.for_class(AssetClass::Asset);
        for (copied, (from, to)) in previous.iter().zip(next).enumerate() {
            if let Err(e) = store.copy(from, to).await {
                tracing::error!(
                    error = %e,
                    from_key = %from,
                    to_key = %to,
                    copied = copied,
                    "Copy aborted"
                );
                return CopyOutcome::Aborted {
                    copied,
                    failed_key: from.clone(),
                    reason: e.to_string(),
                };
            }
        }

        CopyOutcome::Copied {
            count: previous.len(),
        }
    }

    async fn ingest_image(
        &self,
        file: RawAsset,
        folder: &str,
        policy: NormalizationPolicy,
    ) -> Result<StorageObjectKey, MediaError> {
        let format = DetectedFormat::sniff(file.data());

        let (data, content_type, extension) = if format.is_passthrough() {
            tracing::debug!(
                file_name = %file.file_name(),
                content_type = %format.content_type(),
                "Storing image without normalization"
            );
            (
                file.data().clone(),
                format.content_type(),
                format.extension.unwrap_or("bin"),
            )
        } else if format.kind != AssetKind::Image {
            return Err(MediaError::ImageDecode(format!(
                "not an image (detected {})",
                format.content_type()
            )));
        } else {
            let data = file.data().clone();
            let original_size = file.declared_size();
            let normalized = tokio::task::spawn_blocking(move || {
                ImageNormalizer::normalize(&data, &format, original_size, &policy)
            })
            .await
            .map_err(|e| MediaError::Internal(e.to_string()))??;

            tracing::info!(
                file_name = %file.file_name(),
                source = %format!("{}x{}", normalized.metadata.source_width, normalized.metadata.source_height),
                output = %format!("{}x{}", normalized.metadata.width, normalized.metadata.height),
                original_size = normalized.metadata.original_size,
                output_size = normalized.metadata.output_size,
                "Image normalized"
            );

            let encoded = normalized.encoded;
            (encoded.data, encoded.mime, encoded.extension)
        };

        let key = StorageObjectKey::for_asset(folder, extension);
        self.put(AssetClass::Asset, folder, &key, data, content_type)
            .await?;
        Ok(key)
    }

    async fn ingest_file(
        &self,
        file: RawAsset,
        folder: &str,
    ) -> Result<StorageObjectKey, MediaError> {
        self.validator.validate_file_size(file.declared_size())?;
        let format = DetectedFormat::sniff_generic(file.data(), file.file_name())?;

        let name = match format.extension {
            Some(extension) if extension != "pdf" => {
                format!("{}.{}", sanitized_stem(file.file_name()), extension)
            }
            _ => sanitize_filename(file.file_name()),
        };

        let key = StorageObjectKey::for_file(folder, &name);
        self.put(
            AssetClass::Asset,
            folder,
            &key,
            file.data().clone(),
            format.content_type(),
        )
        .await?;
        Ok(key)
    }

    async fn ingest_video(
        &self,
        folder: &str,
        file: RawAsset,
        format: DetectedFormat,
    ) -> Result<VideoUpload, MediaError> {
        let extension = format.extension.unwrap_or("mp4");

        // Dropped on every exit path, after both uploads
        let workdir = TempDir::new()?;
        let input = workdir.path().join(format!("input.{}", extension));
        tokio::fs::write(&input, file.data()).await?;

        let asset = self.extractor.extract(&input).await?;
        let frame = asset.frame;
        let thumbnail = tokio::task::spawn_blocking(move || ImageCompressor::compress_png(&frame))
            .await
            .map_err(|e| MediaError::Internal(e.to_string()))??;

        let id = Uuid::new_v4();
        let video_key = StorageObjectKey::for_asset_with_id(folder, id, extension);
        let thumbnail_key = StorageObjectKey::for_asset_with_id(folder, id, thumbnail.extension);

        let video = self
            .put(
                AssetClass::Video,
                folder,
                &video_key,
                file.data().clone(),
                format.content_type(),
            )
            .await?;
        let thumb = self
            .put(
                AssetClass::Video,
                folder,
                &thumbnail_key,
                thumbnail.data,
                thumbnail.mime,
            )
            .await?;

        tracing::info!(
            video_key = %video_key,
            thumbnail_key = %thumbnail_key,
            duration_seconds = asset.duration_seconds,
            "Video stored"
        );

        drop(workdir);

        Ok(VideoUpload {
            url: video.url,
            thumbnail: thumb.url,
            duration_seconds: asset.duration_seconds,
            video_key,
            thumbnail_key,
        })
    }

    async fn put(
        &self,
        class: AssetClass,
        folder: &str,
        key: &StorageObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<mediabay_storage::StoredObject, MediaError> {
        self.storage
            .for_class(class)
            .put(key.as_str(), data, content_type)
            .await
            .map_err(|e| MediaError::upload(folder, e))
    }

    /// Run one item under the configured deadline, if any.
    ///
    /// Expiry drops the item future, so pending storage calls and extractor processes
    /// (`kill_on_drop`) stop. Work already handed to `spawn_blocking` (image
    /// normalization, thumbnail encoding) runs to completion in the background and its
    /// result is discarded.
    async fn with_deadline<T, F>(&self, fut: F) -> Result<T, MediaError>
    where
        F: Future<Output = Result<T, MediaError>>,
    {
        match self.item_deadline {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .map_err(|_| MediaError::DeadlineExceeded(deadline))?,
            None => fut.await,
        }
    }
}

fn batch_failure(
    code: BatchFailureCode,
    index: usize,
    file_name: String,
    source: MediaError,
) -> MediaError {
    tracing::warn!(
        code = code.code(),
        index = index,
        file_name = %file_name,
        error = %source,
        "Batch item failed, aborting batch"
    );
    MediaError::BatchItem {
        code,
        index,
        file_name,
        source: Box::new(source),
    }
}
