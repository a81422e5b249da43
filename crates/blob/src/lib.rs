//! Blob storage: a minimal object-store abstraction (put, list, get, delete)
//! with in-memory and local-filesystem backends.
//!
//! Paths are `/`-separated keys such as `chat-exports/buffer/anon/1700000000000-x.ndjson`.
//! Listing order is unspecified; callers sort on [`BlobMeta::uploaded_at`].

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;

pub use {
    error::StoreError,
    fs::FsStore,
    memory::MemoryStore,
    store::{BlobMeta, BlobStore, PutOptions},
};
