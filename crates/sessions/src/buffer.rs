use std::sync::Arc;

use {
    bytes::Bytes,
    chatlog_blob::{BlobMeta, BlobStore, PutOptions},
    chrono::Utc,
    rand::Rng,
    serde::Deserialize,
    serde_json::Value,
    tracing::info,
};

use crate::{
    error::LogError,
    event::{MessageEvent, now_timestamp, strip_tags},
    key::SessionId,
    layout::StorageLayout,
};

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 11;

/// Input for [`BufferWriter::append`], shaped like the `/log/buffer` body.
///
/// `content` stays a raw JSON value so a non-string payload is reported as a
/// validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferRequest {
    pub session_id: Option<String>,
    pub role: Option<String>,
    pub content: Option<Value>,
    pub ts: Option<String>,
}

impl BufferRequest {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            session_id: None,
            role: Some(role.into()),
            content: Some(Value::String(content.into())),
            ts: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_ts(mut self, ts: impl Into<String>) -> Self {
        self.ts = Some(ts.into());
        self
    }
}

/// Appends one chat event per call as its own blob. Never reads or rewrites
/// existing objects, so concurrent writers cannot clobber each other.
pub struct BufferWriter {
    store: Arc<dyn BlobStore>,
    layout: StorageLayout,
}

impl BufferWriter {
    pub fn new(store: Arc<dyn BlobStore>, layout: StorageLayout) -> Self {
        Self { store, layout }
    }

    pub async fn append(&self, req: BufferRequest) -> Result<BlobMeta, LogError> {
        let role = match req.role {
            Some(role) if !role.is_empty() => role,
            _ => return Err(LogError::Validation("role and content required".into())),
        };
        let Some(Value::String(content)) = req.content else {
            return Err(LogError::Validation("role and content required".into()));
        };

        let session = SessionId::from_optional(req.session_id.as_deref());
        let event = MessageEvent {
            role,
            content: strip_tags(&content).into_owned(),
            timestamp: req.ts.unwrap_or_else(now_timestamp),
        };
        let record = event.to_record()?;

        let key = self
            .layout
            .buffer_key(&session, Utc::now().timestamp_millis(), &random_suffix());
        let meta = self
            .store
            .put(
                &key,
                Bytes::from(record),
                PutOptions::default().with_content_type("application/x-ndjson"),
            )
            .await?;

        info!(session = %session, path = %meta.path, role = %event.role, "buffered chat event");
        Ok(meta)
    }
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}
