//! Session chat-log buffering and export.
//!
//! Each chat turn is appended as its own NDJSON object at
//! `<root>/buffer/<session>/<epochMillis>-<random>.ndjson`; a flush merges a
//! session's buffered objects (in upload order) into one readable transcript
//! at `<root>/exports/<session>/<epochMillis>.txt` and removes the buffer.
//!
//! Both operations are stateless and talk only to an injected
//! [`BlobStore`](chatlog_blob::BlobStore).

pub mod buffer;
pub mod error;
pub mod event;
pub mod flush;
pub mod key;
pub mod layout;
pub mod render;

#[cfg(test)]
mod test_support;

pub use {
    buffer::{BufferRequest, BufferWriter},
    error::LogError,
    event::{MessageEvent, strip_tags},
    flush::{Cleanup, ExportReport, FlushMerger, FlushOutcome, SweepReport},
    key::{DEFAULT_SESSION, SessionId},
    layout::StorageLayout,
};
