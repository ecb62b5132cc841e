use mediabay_core::BatchFailureCode;
use serde::Serialize;

use crate::compression::QualityFormula;
use crate::image::{OrientationTable, ResizePolicy};

/// Everything that varies between image pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizationPolicy {
    pub resize: ResizePolicy,
    pub quality: QualityFormula,
    pub orientation: OrientationTable,
    /// Code stamped on an item failure when a batch runs under this policy
    #[serde(skip)]
    pub failure_code: BatchFailureCode,
}

impl NormalizationPolicy {
    /// Feed and profile images: longer edge capped at 2048, tiered quality.
    pub fn standard() -> Self {
        Self {
            resize: ResizePolicy::MaxEdge { max_edge: 2048 },
            quality: QualityFormula::Tiered,
            orientation: OrientationTable::Complete,
            failure_code: BatchFailureCode::ImageUpload,
        }
    }

    /// Near-original images: only shrunk above 12 MP, quality falls off with size.
    pub fn origin() -> Self {
        Self {
            resize: ResizePolicy::PixelArea {
                max_pixels: 12_000_000,
                target_long_edge: 3464,
            },
            quality: QualityFormula::InverseRatio,
            orientation: OrientationTable::Complete,
            failure_code: BatchFailureCode::Preprocess,
        }
    }

    pub fn with_orientation(mut self, orientation: OrientationTable) -> Self {
        self.orientation = orientation;
        self
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let standard = NormalizationPolicy::standard();
        assert_eq!(standard.resize, ResizePolicy::MaxEdge { max_edge: 2048 });
        assert_eq!(standard.quality, QualityFormula::Tiered);
        assert_eq!(standard.failure_code.code(), "S3-002");

        let origin = NormalizationPolicy::origin();
        assert_eq!(origin.quality, QualityFormula::InverseRatio);
        assert_eq!(origin.failure_code.code(), "S3-005");
        assert_eq!(origin.orientation, OrientationTable::Complete);
    }

    #[test]
    fn test_with_orientation() {
        let policy = NormalizationPolicy::standard().with_orientation(OrientationTable::RotationsOnly);
        assert_eq!(policy.orientation, OrientationTable::RotationsOnly);
        assert_eq!(policy.resize, NormalizationPolicy::standard().resize);
    }
}
