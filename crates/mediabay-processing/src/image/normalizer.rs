use image::GenericImageView;
use mediabay_core::MediaError;
use serde::Serialize;

use super::geometry::flatten_alpha;
use super::orientation::{read_orientation_tag, OrientationTransform};
use crate::compression::{EncodedImage, ImageCompressor};
use crate::policy::NormalizationPolicy;
use crate::sniff::DetectedFormat;

/// What happened to one image, for logging.
#[derive(Debug, Clone, Serialize)]
pub struct ImageMetadata {
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
    pub source_format: &'static str,
    pub original_size: u64,
    pub output_size: u64,
    pub orientation: OrientationTransform,
    pub quality: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub encoded: EncodedImage,
    pub metadata: ImageMetadata,
}

/// Decode, orient, resize and re-encode one image.
///
/// CPU-bound; callers on the async runtime run it under `spawn_blocking`.
pub struct ImageNormalizer;

impl ImageNormalizer {
    pub fn normalize(
        data: &[u8],
        format: &DetectedFormat,
        original_size: u64,
        policy: &NormalizationPolicy,
    ) -> Result<NormalizedImage, MediaError> {
        let tag = if format.can_carry_exif() {
            read_orientation_tag(data)?
        } else {
            1
        };
        let orientation = policy.orientation.resolve(tag);

        let img =
            image::load_from_memory(data).map_err(|e| MediaError::ImageDecode(e.to_string()))?;
        let (source_width, source_height) = img.dimensions();

        let img = flatten_alpha(img);
        let img = orientation.apply(img);
        let img = policy.resize.apply(img);
        let (width, height) = img.dimensions();

        let quality = policy.quality.quality_for(original_size);
        let encoded = ImageCompressor::compress_jpeg(&img, quality)?;

        let metadata = ImageMetadata {
            source_width,
            source_height,
            width,
            height,
            source_format: format.content_type(),
            original_size,
            output_size: encoded.len() as u64,
            orientation,
            quality: encoded.quality,
        };

        tracing::debug!(
            source = %format!("{}x{}", source_width, source_height),
            output = %format!("{}x{}", width, height),
            orientation = ?orientation,
            quality = quality,
            original_size = original_size,
            output_size = metadata.output_size,
            "Normalized image"
        );

        Ok(NormalizedImage { encoded, metadata })
    }
}
