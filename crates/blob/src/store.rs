//! Storage abstraction for buffered chat records and their exports.
use {
    async_trait::async_trait,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    serde::Serialize,
};

use crate::error::{Result, StoreError};

/// Metadata the store reports for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMeta {
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
    /// Backend-specific locator (`memory://…`, `file://…`).
    pub url: String,
    pub size: u64,
}

/// Options for [`BlobStore::put`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Replace an existing object at the same path instead of failing.
    pub allow_overwrite: bool,
    pub content_type: Option<String>,
}

impl PutOptions {
    pub fn overwrite() -> Self {
        Self {
            allow_overwrite: true,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &str;

    async fn put(&self, path: &str, body: Bytes, opts: PutOptions) -> Result<BlobMeta>;

    /// All objects whose path starts with `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>>;

    async fn get(&self, path: &str) -> Result<Bytes>;

    /// Delete a batch of objects. Paths that do not exist are ignored. A
    /// backend that removes only part of the batch reports the rest in
    /// [`StoreError::DeleteFailed`].
    async fn delete(&self, paths: &[String]) -> Result<()>;
}

/// Reject paths that are empty, absolute, or contain empty / `.` / `..` segments.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.starts_with('/') {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    let bad_segment = path
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == ".." || seg.contains('\\'));
    if bad_segment {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        assert!(validate_path("chat-exports/buffer/anon/1-a.ndjson").is_ok());
    }

    #[test]
    fn rejects_traversal_and_empty_segments() {
        for bad in ["", "/abs", "a/../b", "a//b", "a/./b", "trailing/", "a\\b"] {
            assert!(
                matches!(validate_path(bad), Err(StoreError::InvalidPath(_))),
                "{bad} should be rejected"
            );
        }
    }
}
