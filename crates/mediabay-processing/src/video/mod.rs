//! Video frame extraction via FFmpeg.

pub mod extractor;

pub use extractor::{FfmpegFrameExtractor, FrameExtractor, VideoAsset};
