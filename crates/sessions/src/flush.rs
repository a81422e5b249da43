use std::{collections::BTreeSet, sync::Arc};

use {
    bytes::Bytes,
    chatlog_blob::{BlobMeta, BlobStore, PutOptions, StoreError},
    chrono::Utc,
    tracing::{debug, info, warn},
};

use crate::{
    error::LogError,
    key::SessionId,
    layout::StorageLayout,
    render::{export_body, render_lines},
};

/// What happened to the buffer objects after the export was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Complete,
    /// Export succeeded but some buffer objects could not be removed; they will
    /// be merged again by the next flush. `orphaned` names the objects the
    /// store reported as not deleted, or every listed object when the store
    /// could not say which.
    Failed {
        error: String,
        orphaned: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub export: BlobMeta,
    /// Buffer objects whose contents made it into the export.
    pub merged: usize,
    /// Buffer objects that could not be fetched and were left out.
    pub skipped: Vec<String>,
    /// Rendered transcript lines.
    pub lines: usize,
    pub cleanup: Cleanup,
}

#[derive(Debug, Clone)]
pub enum FlushOutcome {
    NothingToFlush,
    Exported(ExportReport),
}

impl FlushOutcome {
    pub fn export_path(&self) -> Option<&str> {
        match self {
            Self::NothingToFlush => None,
            Self::Exported(report) => Some(&report.export.path),
        }
    }
}

/// Result of flushing every session that has buffered objects.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub exported: Vec<(SessionId, ExportReport)>,
    pub failed: Vec<(SessionId, String)>,
}

/// Merges a session's buffered objects into one export and clears the buffer.
pub struct FlushMerger {
    store: Arc<dyn BlobStore>,
    layout: StorageLayout,
}

impl FlushMerger {
    pub fn new(store: Arc<dyn BlobStore>, layout: StorageLayout) -> Self {
        Self { store, layout }
    }

    pub async fn flush(&self, session_id: Option<&str>) -> Result<FlushOutcome, LogError> {
        self.flush_session(&SessionId::from_optional(session_id))
            .await
    }

    /// List → fetch → merge → write export → delete buffer.
    ///
    /// Any failure up to and including the export write aborts the flush.
    /// Individual fetch failures only drop that object; a failed delete is
    /// reported in [`ExportReport::cleanup`].
    pub async fn flush_session(&self, session: &SessionId) -> Result<FlushOutcome, LogError> {
        let prefix = self.layout.buffer_prefix(session);
        let mut blobs = self.store.list(&prefix).await?;
        if blobs.is_empty() {
            debug!(session = %session, "no buffer to flush");
            return Ok(FlushOutcome::NothingToFlush);
        }

        // Listing order is backend-defined; upload time is the merge order and
        // the key (which starts with the write time) breaks ties.
        blobs.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.path.cmp(&b.path))
        });

        let mut combined = String::new();
        let mut merged = 0;
        let mut skipped = Vec::new();
        for blob in &blobs {
            match self.store.get(&blob.path).await {
                Ok(body) => {
                    combined.push_str(&String::from_utf8_lossy(&body));
                    combined.push('\n');
                    merged += 1;
                },
                Err(e) => {
                    warn!(session = %session, path = %blob.path, error = %e, "skipping unreadable buffer object");
                    skipped.push(blob.path.clone());
                },
            }
        }

        let lines = render_lines(&combined);
        let export_key = self
            .layout
            .export_key(session, Utc::now().timestamp_millis());
        let export = self
            .store
            .put(
                &export_key,
                Bytes::from(export_body(&lines)),
                PutOptions::overwrite().with_content_type("text/plain; charset=utf-8"),
            )
            .await?;

        let paths: Vec<String> = blobs.into_iter().map(|b| b.path).collect();
        let cleanup = match self.store.delete(&paths).await {
            Ok(()) => Cleanup::Complete,
            Err(e) => {
                let error = e.to_string();
                let orphaned = match e {
                    StoreError::DeleteFailed { paths: failed, .. } => failed,
                    _ => paths,
                };
                warn!(session = %session, count = orphaned.len(), error = %error, "failed to delete buffer objects");
                Cleanup::Failed { error, orphaned }
            },
        };

        info!(
            session = %session,
            path = %export.path,
            merged,
            skipped = skipped.len(),
            lines = lines.len(),
            "flushed session buffer"
        );
        Ok(FlushOutcome::Exported(ExportReport {
            export,
            merged,
            skipped,
            lines: lines.len(),
            cleanup,
        }))
    }

    /// Sessions that currently have at least one buffered object.
    pub async fn pending_sessions(&self) -> Result<Vec<SessionId>, LogError> {
        let blobs = self.store.list(&self.layout.buffer_root()).await?;
        let sessions: BTreeSet<SessionId> = blobs
            .iter()
            .filter_map(|b| self.layout.session_of(&b.path))
            .collect();
        Ok(sessions.into_iter().collect())
    }

    /// Flush every pending session. A failing session does not stop the sweep.
    pub async fn sweep(&self) -> Result<SweepReport, LogError> {
        let mut report = SweepReport::default();
        for session in self.pending_sessions().await? {
            match self.flush_session(&session).await {
                Ok(FlushOutcome::Exported(export)) => report.exported.push((session, export)),
                Ok(FlushOutcome::NothingToFlush) => {},
                Err(e) => {
                    warn!(session = %session, error = %e, "sweep: flush failed");
                    report.failed.push((session, e.to_string()));
                },
            }
        }
        Ok(report)
    }
}
