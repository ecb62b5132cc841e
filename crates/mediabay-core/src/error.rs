//! Error types module
//!
//! Every failure the ingestion pipeline can report is a [`MediaError`]. Each variant
//! self-describes a stable string code and an HTTP-like status through
//! [`ErrorMetadata`], so a calling layer can map it to a transport response without
//! the pipeline ever producing one itself.

use std::io;
use std::time::Duration;

/// Boxed error used to carry backend causes across crate boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for bad input that could not be processed
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Coarse failure class, independent of the code a batch wraps it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Decode,
    Upload,
    Deadline,
    Internal,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code the caller should map this error to
    fn http_status_code(&self) -> u16;

    /// Stable machine-readable error code (e.g. "S3-004")
    fn error_code(&self) -> &'static str;

    /// Failure class
    fn category(&self) -> ErrorCategory;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Code a batch entry point stamps on a failed item.
///
/// The standard image batch reports `S3-002` as a server error; the origin image batch
/// and the generic-file batch report `S3-005` as a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFailureCode {
    ImageUpload,
    Preprocess,
}

impl BatchFailureCode {
    pub fn code(self) -> &'static str {
        match self {
            BatchFailureCode::ImageUpload => "S3-002",
            BatchFailureCode::Preprocess => "S3-005",
        }
    }

    pub fn http_status_code(self) -> u16 {
        match self {
            BatchFailureCode::ImageUpload => 500,
            BatchFailureCode::Preprocess => 400,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No files to upload")]
    EmptyBatch,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Disallowed format: extension {extension:?}, content type {content_type:?}")]
    DisallowedFormat {
        extension: Option<String>,
        content_type: Option<String>,
    },

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("EXIF metadata error: {0}")]
    Exif(String),

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Video decode error: {0}")]
    VideoDecode(String),

    #[error("Upload to folder '{folder}' failed")]
    Upload {
        folder: String,
        #[source]
        source: BoxError,
    },

    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("{} item {index} ({file_name}) failed", .code.code())]
    BatchItem {
        code: BatchFailureCode,
        index: usize,
        file_name: String,
        #[source]
        source: Box<MediaError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Wrap a storage-layer failure with the destination folder.
    pub fn upload(folder: impl Into<String>, source: impl Into<BoxError>) -> Self {
        MediaError::Upload {
            folder: folder.into(),
            source: source.into(),
        }
    }

    /// The innermost pipeline error, looking through batch wrappers.
    pub fn root_cause(&self) -> &MediaError {
        match self {
            MediaError::BatchItem { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, category, log_level).
fn media_error_static_metadata(
    err: &MediaError,
) -> (u16, &'static str, ErrorCategory, LogLevel) {
    match err {
        MediaError::EmptyBatch => (400, "S3-001", ErrorCategory::Validation, LogLevel::Debug),
        MediaError::FileTooLarge { .. } => {
            (400, "S3-000", ErrorCategory::Validation, LogLevel::Debug)
        }
        MediaError::DisallowedFormat { .. } => {
            (400, "S3-000", ErrorCategory::Validation, LogLevel::Debug)
        }
        MediaError::ImageDecode(_) | MediaError::Exif(_) | MediaError::Encode(_) => {
            (400, "S3-005", ErrorCategory::Decode, LogLevel::Warn)
        }
        MediaError::VideoDecode(_) => (400, "S3-006", ErrorCategory::Decode, LogLevel::Warn),
        MediaError::Upload { .. } => (400, "S3-004", ErrorCategory::Upload, LogLevel::Error),
        MediaError::DeadlineExceeded(_) => {
            (504, "S3-007", ErrorCategory::Deadline, LogLevel::Error)
        }
        MediaError::BatchItem { code, source, .. } => {
            let inner = media_error_static_metadata(source);
            (code.http_status_code(), code.code(), inner.2, inner.3)
        }
        MediaError::Io(_) | MediaError::Internal(_) => {
            (500, "INTERNAL_ERROR", ErrorCategory::Internal, LogLevel::Error)
        }
    }
}

impl ErrorMetadata for MediaError {
    fn http_status_code(&self) -> u16 {
        media_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        media_error_static_metadata(self).1
    }

    fn category(&self) -> ErrorCategory {
        media_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        media_error_static_metadata(self).3
    }
}
