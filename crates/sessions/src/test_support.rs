//! Fault-injecting store wrapper for tests.

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    chatlog_blob::{BlobMeta, BlobStore, MemoryStore, PutOptions, StoreError},
};

/// Wraps a [`MemoryStore`] and fails selected operations on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_list: bool,
    fail_put: bool,
    fail_export_put: bool,
    fail_delete: bool,
    fail_get: HashSet<String>,
    fail_delete_of: HashSet<String>,
    reverse_listing: bool,
    pub delete_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn fail_put(mut self) -> Self {
        self.fail_put = true;
        self
    }

    /// Fail only writes that target an export object.
    pub fn fail_export_put(mut self) -> Self {
        self.fail_export_put = true;
        self
    }

    pub fn fail_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Refuse to delete `path` while still deleting the rest of the batch.
    pub fn fail_delete_of(mut self, path: &str) -> Self {
        self.fail_delete_of.insert(path.to_string());
        self
    }

    pub fn fail_get(mut self, path: &str) -> Self {
        self.fail_get.insert(path.to_string());
        self
    }

    /// List newest key first, opposite of the memory store's key order.
    pub fn reverse_listing(mut self) -> Self {
        self.reverse_listing = true;
        self
    }
}

#[async_trait]
impl BlobStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn put(&self, path: &str, body: Bytes, opts: PutOptions) -> Result<BlobMeta, StoreError> {
        if self.fail_put || (self.fail_export_put && path.contains("/exports/")) {
            return Err(StoreError::Backend("injected put failure".into()));
        }
        self.inner.put(path, body, opts).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, StoreError> {
        if self.fail_list {
            return Err(StoreError::Backend("injected list failure".into()));
        }
        let mut listed = self.inner.list(prefix).await?;
        if self.reverse_listing {
            listed.reverse();
        }
        Ok(listed)
    }

    async fn get(&self, path: &str) -> Result<Bytes, StoreError> {
        if self.fail_get.contains(path) {
            return Err(StoreError::Backend(format!("injected get failure: {path}")));
        }
        self.inner.get(path).await
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            return Err(StoreError::Backend("injected delete failure".into()));
        }
        let (stuck, rest): (Vec<String>, Vec<String>) = paths
            .iter()
            .cloned()
            .partition(|p| self.fail_delete_of.contains(p));
        self.inner.delete(&rest).await?;
        if stuck.is_empty() {
            Ok(())
        } else {
            Err(StoreError::DeleteFailed {
                paths: stuck,
                reason: "injected delete failure".into(),
            })
        }
    }
}
