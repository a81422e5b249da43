use std::sync::Arc;

use {
    chatlog_blob::{BlobStore, FsStore, MemoryStore},
    chatlog_config::{StorageBackend, StorageConfig},
    tracing::{info, warn},
};

/// Open the blob store named by the config.
pub fn open_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match cfg.backend {
        StorageBackend::Memory => {
            warn!("using in-memory blob store; buffered messages are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        },
        StorageBackend::Fs => {
            let dir = cfg.resolved_dir();
            std::fs::create_dir_all(&dir).map_err(|e| {
                anyhow::anyhow!("failed to create blob dir {}: {e}", dir.display())
            })?;
            info!(dir = %dir.display(), "using filesystem blob store");
            Ok(Arc::new(FsStore::new(dir)))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_configured_backend() {
        let memory = open_store(&StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(memory.name(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let blobs = dir.path().join("nested").join("blobs");
        let fs = open_store(&StorageConfig {
            backend: StorageBackend::Fs,
            dir: Some(blobs.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fs.name(), "fs");
        assert!(blobs.is_dir());
    }
}
