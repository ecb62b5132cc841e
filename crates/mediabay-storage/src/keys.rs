//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{uuid}.{ext}` for normalized assets, `{folder}/{uuid}/{file_name}`
//! for generic files. The uuid is v4, so every key is fresh and written once.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Object key produced by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageObjectKey(String);

impl StorageObjectKey {
    /// `{folder}/{uuid}.{ext}`
    pub fn for_asset(folder: &str, extension: &str) -> Self {
        Self::for_asset_with_id(folder, Uuid::new_v4(), extension)
    }

    /// Key for an asset with a caller-chosen id, so sibling objects (a video and its
    /// thumbnail) can share one uuid.
    pub fn for_asset_with_id(folder: &str, id: Uuid, extension: &str) -> Self {
        let name = format!("{}.{}", id, extension.trim_start_matches('.'));
        StorageObjectKey(join(folder, &name))
    }

    /// `{folder}/{uuid}/{file_name}`
    ///
    /// `file_name` must already be sanitized; it is used verbatim.
    pub fn for_file(folder: &str, file_name: &str) -> Self {
        let name = format!("{}/{}", Uuid::new_v4(), file_name);
        StorageObjectKey(join(folder, &name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for StorageObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything before the last `/` of a prefix, without a leading `/`.
pub(crate) fn parent_segment(prefix: &str) -> &str {
    prefix
        .trim_start_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}

/// Plain string prefix match, as S3 `ListObjects` applies it. A leading `/` is ignored.
pub(crate) fn matches_prefix(key: &str, prefix: &str) -> bool {
    key.starts_with(prefix.trim_start_matches('/'))
}

/// Strip surrounding slashes from a folder so keys never start with `/` or contain `//`.
pub fn normalize_folder(folder: &str) -> &str {
    folder.trim_matches('/')
}

fn join(folder: &str, name: &str) -> String {
    let folder = normalize_folder(folder);
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}
