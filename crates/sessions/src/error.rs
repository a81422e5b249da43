use chatlog_blob::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Missing or malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// Any failure reported by the blob store.
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LogError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
