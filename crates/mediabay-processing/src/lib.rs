//! Mediabay Processing Library
//!
//! Turns untrusted uploads into canonical stored assets: content sniffing, EXIF
//! orientation, resizing, JPEG re-encoding, video thumbnails, and the batch operations
//! that drive them against object storage.

pub mod compression;
pub mod image;
pub mod policy;
pub mod sniff;
pub mod upload;
pub mod validator;
pub mod video;

// Re-export commonly used types
pub use compression::{EncodedImage, ImageCompressor, QualityFormula};
pub use self::image::{
    ImageMetadata, ImageNormalizer, NormalizedImage, OrientationTable, OrientationTransform,
    ResizePolicy,
};
pub use policy::NormalizationPolicy;
pub use sniff::{AssetKind, DetectedFormat};
pub use upload::{
    CopyOutcome, CopySkipReason, MediaIngestor, RawAsset, RemovalSummary, VideoUpload,
    LIST_MAX_KEYS,
};
pub use validator::{sanitize_filename, FileValidator};
pub use video::{FfmpegFrameExtractor, FrameExtractor, VideoAsset};
