//! Content-based format detection.
//!
//! Only magic numbers are consulted. Client-supplied extensions and MIME types are never
//! trusted, with the single exception of the `.pdf` override on the generic-file path.

use mediabay_core::MediaError;
use serde::Serialize;

/// Broad class of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Unknown,
}

/// What the bytes actually are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedFormat {
    pub kind: AssetKind,
    pub extension: Option<&'static str>,
    pub mime: Option<&'static str>,
}

/// Canonical pairs accepted on the generic-file path
const GENERIC_ALLOW_LIST: &[(&str, &str)] = &[
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// Formats stored as uploaded instead of being re-encoded
const PASSTHROUGH_MIME_TYPES: &[&str] = &["image/webp", "image/heif", "image/heic", "image/avif"];

const PDF_MIME_TYPE: &str = "application/pdf";

impl DetectedFormat {
    pub const UNKNOWN: DetectedFormat = DetectedFormat {
        kind: AssetKind::Unknown,
        extension: None,
        mime: None,
    };

    /// Detect a format from magic numbers. Never fails.
    pub fn sniff(data: &[u8]) -> Self {
        let Some(detected) = infer::get(data) else {
            return Self::UNKNOWN;
        };

        let kind = match detected.matcher_type() {
            infer::MatcherType::Image => AssetKind::Image,
            infer::MatcherType::Video => AssetKind::Video,
            _ => AssetKind::Unknown,
        };

        DetectedFormat {
            kind,
            extension: Some(detected.extension()),
            mime: Some(detected.mime_type()),
        }
    }

    /// Detection for the generic-file path.
    ///
    /// A file name ending in `.pdf` is accepted as a PDF without sniffing. Everything else
    /// must sniff to one of the allow-listed image pairs.
    pub fn sniff_generic(data: &[u8], file_name: &str) -> Result<Self, MediaError> {
        if file_name.to_lowercase().ends_with(".pdf") {
            return Ok(DetectedFormat {
                kind: AssetKind::Unknown,
                extension: Some("pdf"),
                mime: Some(PDF_MIME_TYPE),
            });
        }

        let detected = Self::sniff(data);
        match (detected.extension, detected.mime) {
            (Some(ext), Some(mime))
                if GENERIC_ALLOW_LIST
                    .iter()
                    .any(|(allowed_ext, allowed_mime)| *allowed_ext == ext && *allowed_mime == mime) =>
            {
                Ok(detected)
            }
            (extension, mime) => Err(MediaError::DisallowedFormat {
                extension: extension.map(String::from),
                content_type: mime.map(String::from),
            }),
        }
    }

    /// Image formats that skip normalization and are stored raw.
    pub fn is_passthrough(&self) -> bool {
        self.mime
            .map(|mime| PASSTHROUGH_MIME_TYPES.contains(&mime))
            .unwrap_or(false)
    }

    /// Containers that can carry an EXIF block.
    pub fn can_carry_exif(&self) -> bool {
        matches!(
            self.mime,
            Some("image/jpeg" | "image/png" | "image/tiff" | "image/webp" | "image/heif")
        )
    }

    pub fn content_type(&self) -> &'static str {
        self.mime.unwrap_or("application/octet-stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    const GIF_MAGIC: &[u8] = b"GIF89a\x01\x00\x01\x00";
    const WEBP_MAGIC: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";
    const MP4_MAGIC: &[u8] = b"\0\0\0\x18ftypmp42\0\0\0\0mp42isom";

    #[test]
    fn test_sniff_ignores_everything_but_bytes() {
        let png = DetectedFormat::sniff(PNG_MAGIC);
        assert_eq!(png.kind, AssetKind::Image);
        assert_eq!(png.extension, Some("png"));
        assert_eq!(png.mime, Some("image/png"));

        let jpeg = DetectedFormat::sniff(JPEG_MAGIC);
        assert_eq!(jpeg.extension, Some("jpg"));
        assert_eq!(jpeg.content_type(), "image/jpeg");
    }

    #[test]
    fn test_sniff_video() {
        let mp4 = DetectedFormat::sniff(MP4_MAGIC);
        assert_eq!(mp4.kind, AssetKind::Video);
        assert_eq!(mp4.mime, Some("video/mp4"));
    }

    #[test]
    fn test_unknown_content() {
        let unknown = DetectedFormat::sniff(b"just some text");
        assert_eq!(unknown, DetectedFormat::UNKNOWN);
        assert_eq!(unknown.content_type(), "application/octet-stream");
        assert!(!unknown.is_passthrough());
    }

    #[test]
    fn test_passthrough_formats() {
        assert!(DetectedFormat::sniff(WEBP_MAGIC).is_passthrough());
        assert!(!DetectedFormat::sniff(PNG_MAGIC).is_passthrough());
        assert!(!DetectedFormat::sniff(GIF_MAGIC).is_passthrough());
    }

    #[test]
    fn test_exif_capable_containers() {
        assert!(DetectedFormat::sniff(JPEG_MAGIC).can_carry_exif());
        assert!(DetectedFormat::sniff(PNG_MAGIC).can_carry_exif());
        assert!(!DetectedFormat::sniff(GIF_MAGIC).can_carry_exif());
    }

    #[test]
    fn test_generic_allow_list() {
        let gif = DetectedFormat::sniff_generic(GIF_MAGIC, "anim.gif").unwrap();
        assert_eq!(gif.mime, Some("image/gif"));

        // the client name is irrelevant; the bytes decide
        let png = DetectedFormat::sniff_generic(PNG_MAGIC, "photo.jpg").unwrap();
        assert_eq!(png.extension, Some("png"));
    }

    #[test]
    fn test_generic_rejects_other_formats() {
        let err = DetectedFormat::sniff_generic(WEBP_MAGIC, "image.webp").unwrap_err();
        match err {
            MediaError::DisallowedFormat {
                extension,
                content_type,
            } => {
                assert_eq!(extension.as_deref(), Some("webp"));
                assert_eq!(content_type.as_deref(), Some("image/webp"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            DetectedFormat::sniff_generic(b"plain text", "notes.txt"),
            Err(MediaError::DisallowedFormat {
                extension: None,
                content_type: None
            })
        ));
    }

    #[test]
    fn test_pdf_name_override() {
        let pdf = DetectedFormat::sniff_generic(b"not really a pdf", "Contract.PDF").unwrap();
        assert_eq!(pdf.extension, Some("pdf"));
        assert_eq!(pdf.content_type(), "application/pdf");
    }
}
