//! Test helpers: fixtures, tempdir-backed stores and a scripted frame extractor.
//!
//! Run from workspace root: `cargo test -p mediabay-processing`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use mediabay_core::{MediaError, ProcessingConfig};
use mediabay_processing::{FrameExtractor, MediaIngestor, VideoAsset};
use mediabay_storage::StorageGateway;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Frame extractor that never spawns FFmpeg.
pub struct FakeExtractor {
    outcome: Result<f64, String>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn returning(duration_seconds: f64) -> Self {
        Self {
            outcome: Ok(duration_seconds),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl FrameExtractor for FakeExtractor {
    async fn extract(&self, input: &Path) -> Result<VideoAsset, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(input.exists(), "input must be materialized before extraction");

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            Ok(duration_seconds) => Ok(VideoAsset {
                duration_seconds: *duration_seconds,
                frame: DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 18, Rgb([0, 128, 255]))),
            }),
            Err(message) => Err(MediaError::VideoDecode(message.clone())),
        }
    }
}

pub fn test_config() -> ProcessingConfig {
    ProcessingConfig::default()
}

pub fn ingestor(gateway: StorageGateway) -> MediaIngestor {
    ingestor_with(gateway, Arc::new(FakeExtractor::returning(3.5)), test_config())
}

pub fn ingestor_with(
    gateway: StorageGateway,
    extractor: Arc<dyn FrameExtractor>,
    config: ProcessingConfig,
) -> MediaIngestor {
    MediaIngestor::new(gateway, extractor, &config)
}
