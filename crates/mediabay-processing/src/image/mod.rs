//! Image normalization: orientation, geometry and the pipeline that combines them.

pub mod geometry;
pub mod normalizer;
pub mod orientation;

pub use geometry::{flatten_alpha, ResizePolicy};
pub use normalizer::{ImageMetadata, ImageNormalizer, NormalizedImage};
pub use orientation::{read_orientation_tag, OrientationTable, OrientationTransform};
