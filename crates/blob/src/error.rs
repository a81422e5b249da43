/// Errors reported by a [`BlobStore`](crate::BlobStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Some paths of a batch delete could not be removed. The rest were.
    #[error("failed to delete {} blob(s): {reason}", paths.len())]
    DeleteFailed { paths: Vec<String>, reason: String },

    #[error("{0}")]
    Backend(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
