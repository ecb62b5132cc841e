use mediabay_core::MediaError;

/// Per-file checks for the generic-file path.
///
/// Format checks live in [`crate::sniff`]; this only enforces the size ceiling.
#[derive(Debug, Clone, Copy)]
pub struct FileValidator {
    max_file_size: u64,
}

impl FileValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), MediaError> {
        if size > self.max_file_size {
            return Err(MediaError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }
}

/// Reduce a client file name to a single path segment, keeping it readable.
///
/// Directory components (either separator) and control characters are dropped; Unicode
/// letters, spaces and inner dots are kept. A name that is empty or nothing but dots
/// becomes `file`, with its extension preserved. The result fits in 255 bytes and never
/// loses its extension to truncation.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_BYTES: usize = 255;

    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    let (stem, extension) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && ext.chars().all(char::is_alphanumeric) => {
            (stem, Some(ext))
        }
        _ => (cleaned, None),
    };
    let stem = if stem.trim_matches('.').trim().is_empty() {
        "file"
    } else {
        stem
    };

    match extension {
        Some(ext) => {
            let budget = MAX_BYTES.saturating_sub(ext.len() + 1);
            format!("{}.{}", truncate_to_boundary(stem, budget), ext)
        }
        None => truncate_to_boundary(stem, MAX_BYTES).to_string(),
    }
}

fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// File name without its last extension, sanitized.
pub fn sanitized_stem(filename: &str) -> String {
    let sanitized = sanitize_filename(filename);
    match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => sanitized,
    }
}
