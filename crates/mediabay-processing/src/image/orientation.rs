use image::DynamicImage;
use mediabay_core::MediaError;
use serde::Serialize;
use std::io::Cursor;

/// Pixel transform that brings an image to its upright orientation.
///
/// Each EXIF orientation tag maps to exactly one transform. Transforms are applied as
/// a rotation (clockwise) followed by an optional horizontal flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationTransform {
    Identity,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Mirror across the main diagonal
    Transpose,
    Rotate90,
    /// Mirror across the anti-diagonal
    Transverse,
    Rotate270,
}

impl OrientationTransform {
    /// Map an EXIF orientation tag (1-8). Anything else is identity.
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            2 => OrientationTransform::FlipHorizontal,
            3 => OrientationTransform::Rotate180,
            4 => OrientationTransform::FlipVertical,
            5 => OrientationTransform::Transpose,
            6 => OrientationTransform::Rotate90,
            7 => OrientationTransform::Transverse,
            8 => OrientationTransform::Rotate270,
            _ => OrientationTransform::Identity,
        }
    }

    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            OrientationTransform::Identity => img,
            OrientationTransform::FlipHorizontal => img.fliph(),
            OrientationTransform::Rotate180 => img.rotate180(),
            OrientationTransform::FlipVertical => img.flipv(),
            OrientationTransform::Transpose => img.rotate90().fliph(),
            OrientationTransform::Rotate90 => img.rotate90(),
            OrientationTransform::Transverse => img.rotate270().fliph(),
            OrientationTransform::Rotate270 => img.rotate270(),
        }
    }
}

/// Which tags a policy honours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationTable {
    /// All eight orientations
    #[default]
    Complete,
    /// Pure rotations only (tags 3, 6 and 8); mirrored tags are left as stored
    RotationsOnly,
}

impl OrientationTable {
    pub fn resolve(self, tag: u32) -> OrientationTransform {
        match self {
            OrientationTable::Complete => OrientationTransform::from_tag(tag),
            OrientationTable::RotationsOnly => match tag {
                3 | 6 | 8 => OrientationTransform::from_tag(tag),
                _ => OrientationTransform::Identity,
            },
        }
    }
}

/// Read the EXIF orientation tag from a JPEG, PNG, TIFF, WebP or HEIF container.
///
/// A missing EXIF block or a missing tag yields 1. A block that is present but cannot
/// be parsed is an error. A container truncated before any EXIF block is also read as 1;
/// the decoder reports the damage.
pub fn read_orientation_tag(data: &[u8]) -> Result<u32, MediaError> {
    let mut cursor = Cursor::new(data);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(1),
        Err(exif::Error::Io(e)) => {
            tracing::debug!(error = %e, "Container unreadable while looking for EXIF");
            return Ok(1);
        }
        Err(e) => return Err(MediaError::Exif(e.to_string())),
    };

    let tag = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1);

    tracing::debug!(orientation = tag, "Read EXIF orientation");

    Ok(tag)
}
