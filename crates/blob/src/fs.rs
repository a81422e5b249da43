//! Local-filesystem backend: each blob is a file under a base directory.
use std::{
    ffi::OsStr,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    tokio::io::AsyncWriteExt,
    tracing::{debug, warn},
};

use crate::{
    error::{Result, StoreError},
    store::{BlobMeta, BlobStore, PutOptions, validate_path},
};

#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/').fold(self.base.clone(), |acc, seg| acc.join(seg))
    }

    fn meta_for(&self, path: &str, full: &Path, meta: &std::fs::Metadata) -> BlobMeta {
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        BlobMeta {
            path: path.to_string(),
            uploaded_at: DateTime::<Utc>::from(modified),
            url: format!("file://{}", full.display()),
            size: meta.len(),
        }
    }
}

#[async_trait]
impl BlobStore for FsStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn put(&self, path: &str, body: Bytes, opts: PutOptions) -> Result<BlobMeta> {
        validate_path(path)?;
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Stage under a name `list` skips and publish in one step; readers
        // never see a partial object.
        let tmp = staging_path(&full);
        let meta = match write_synced(&tmp, &body).await {
            Ok(meta) => meta,
            Err(e) => {
                discard(&tmp).await;
                return Err(e.into());
            },
        };
        let published = if opts.allow_overwrite {
            tokio::fs::rename(&tmp, &full).await
        } else {
            let linked = tokio::fs::hard_link(&tmp, &full).await;
            discard(&tmp).await;
            linked
        };
        if let Err(e) = published {
            discard(&tmp).await;
            return Err(match e.kind() {
                ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
                _ => StoreError::Io(e),
            });
        }

        debug!(path, size = meta.len(), "fs store: put");
        Ok(self.meta_for(path, &full, &meta))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>> {
        if prefix.split('/').any(|seg| seg == "..") || prefix.starts_with('/') {
            return Err(StoreError::InvalidPath(prefix.to_string()));
        }
        // Walk only the directory the prefix names; the remainder is a filename filter.
        let dir = match prefix.rfind('/') {
            Some(idx) => self.resolve(&prefix[..idx]),
            None => self.base.clone(),
        };
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let store = self.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || -> Result<Vec<BlobMeta>> {
            let mut found = Vec::new();
            for entry in walkdir::WalkDir::new(&dir).follow_links(false) {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "fs store: skipping unreadable entry");
                        continue;
                    },
                };
                if !entry.file_type().is_file() || is_staging(entry.file_name()) {
                    continue;
                }
                let Ok(rel) = entry.path().strip_prefix(&store.base) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if !key.starts_with(&prefix) {
                    continue;
                }
                let meta = match entry.metadata() {
                    Ok(meta) => meta,
                    // Removed between the directory read and the stat.
                    Err(e) if e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
                        continue;
                    },
                    Err(e) => {
                        return Err(StoreError::Backend(format!(
                            "metadata for {}: {e}",
                            entry.path().display()
                        )));
                    },
                };
                found.push(store.meta_for(&key, entry.path(), &meta));
            }
            Ok(found)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("list task failed: {e}")))?
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        validate_path(path)?;
        match tokio::fs::read(self.resolve(path)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, paths: &[String]) -> Result<()> {
        for path in paths {
            validate_path(path)?;
        }
        let mut failed = Vec::new();
        let mut reason = String::new();
        for path in paths {
            match tokio::fs::remove_file(self.resolve(path)).await {
                Ok(()) => debug!(path = %path, "fs store: deleted"),
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => {
                    warn!(path = %path, error = %e, "fs store: delete failed");
                    if reason.is_empty() {
                        reason = e.to_string();
                    }
                    failed.push(path.clone());
                },
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(StoreError::DeleteFailed {
                paths: failed,
                reason,
            })
        }
    }
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// `<dir>/.<name>.<pid>-<seq>.tmp`, next to the final object.
fn staging_path(full: &Path) -> PathBuf {
    let name = full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    full.with_file_name(format!(".{name}.{}-{seq}.tmp", std::process::id()))
}

fn is_staging(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') && name.ends_with(".tmp")
}

async fn write_synced(tmp: &Path, body: &[u8]) -> std::io::Result<std::fs::Metadata> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp)
        .await?;
    file.write_all(body).await?;
    file.flush().await?;
    file.sync_all().await?;
    file.metadata().await
}

async fn discard(tmp: &Path) {
    match tokio::fs::remove_file(tmp).await {
        Ok(()) => {},
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => warn!(path = %tmp.display(), error = %e, "fs store: failed to remove staging file"),
    }
}
