use std::sync::Arc;

use {
    chatlog_blob::BlobStore,
    chatlog_sessions::{BufferWriter, FlushMerger, StorageLayout},
};

/// Shared gateway runtime state, wrapped in Arc for use across handlers and
/// the sweeper task. Holds no per-session data.
pub struct GatewayState {
    /// Server version string.
    pub version: String,
    /// Name of the blob backend in use.
    pub backend: String,
    pub writer: BufferWriter,
    pub merger: FlushMerger,
}

impl GatewayState {
    pub fn new(store: Arc<dyn BlobStore>, layout: StorageLayout) -> Arc<Self> {
        Arc::new(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: store.name().to_string(),
            writer: BufferWriter::new(Arc::clone(&store), layout.clone()),
            merger: FlushMerger::new(store, layout),
        })
    }
}
