use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use mediabay_core::MediaError;
use serde::Serialize;
use std::io::Cursor;

const MIB: u64 = 1024 * 1024;

/// Payload size at which the inverse-ratio formula starts lowering quality
pub const INVERSE_RATIO_STANDARD_SIZE: u64 = 3_000_000;

/// How JPEG quality is derived from the size of the original upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFormula {
    /// 0.5 above 5 MiB, 0.7 above 2 MiB, 0.9 otherwise
    Tiered,
    /// 1.0 up to 3,000,000 bytes, `3_000_000 / size` above that
    InverseRatio,
}

impl QualityFormula {
    /// Quality in `(0, 1]` for an original payload of `original_size` bytes.
    pub fn quality_for(self, original_size: u64) -> f32 {
        match self {
            QualityFormula::Tiered => {
                if original_size > 5 * MIB {
                    0.5
                } else if original_size > 2 * MIB {
                    0.7
                } else {
                    0.9
                }
            }
            QualityFormula::InverseRatio => {
                if original_size <= INVERSE_RATIO_STANDARD_SIZE {
                    1.0
                } else {
                    (INVERSE_RATIO_STANDARD_SIZE as f64 / original_size as f64) as f32
                }
            }
        }
    }
}

/// Output of an encoder
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Bytes,
    pub mime: &'static str,
    pub extension: &'static str,
    /// Quality the encoder ran at; `None` for lossless output
    pub quality: Option<f32>,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode to progressive JPEG with optimized Huffman tables using mozjpeg.
    ///
    /// `quality` is in `(0, 1]`; it is mapped onto mozjpeg's 1-100 scale.
    pub fn compress_jpeg(img: &DynamicImage, quality: f32) -> Result<EncodedImage, MediaError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();
        let jpeg_quality = (quality * 100.0).round().clamp(1.0, 100.0);

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(jpeg_quality);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        tracing::debug!(
            width = width,
            height = height,
            quality = jpeg_quality,
            size_bytes = jpeg_data.len(),
            "Encoded JPEG"
        );

        Ok(EncodedImage {
            data: Bytes::from(jpeg_data),
            mime: "image/jpeg",
            extension: "jpg",
            quality: Some(quality),
        })
    }

    /// Lossless PNG, used for video thumbnails.
    pub fn compress_png(img: &DynamicImage) -> Result<EncodedImage, MediaError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        Ok(EncodedImage {
            data: Bytes::from(buffer),
            mime: "image/png",
            extension: "png",
            quality: None,
        })
    }
}
