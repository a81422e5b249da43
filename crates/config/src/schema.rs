/// Config schema types (server, storage, flush).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatlogConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub flush: FlushConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects live only as long as the process.
    Memory,
    /// Objects are files under `storage.dir`.
    #[default]
    Fs,
}

/// Blob storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Top-level folder for buffer and export objects.
    pub root: String,

    /// Base directory for the `fs` backend. Defaults to `<data_dir>/blobs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: "chat-exports".into(),
            dir: None,
        }
    }
}

impl StorageConfig {
    /// Directory the `fs` backend writes to.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("blobs"))
    }
}

/// Background flush settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushConfig {
    /// Seconds between automatic sweeps of all buffered sessions; 0 disables.
    pub interval_secs: u64,
}

impl FlushConfig {
    pub fn enabled(&self) -> bool {
        self.interval_secs > 0
    }
}
