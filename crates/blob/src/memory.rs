use std::collections::BTreeMap;

use {
    async_trait::async_trait,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    tokio::sync::RwLock,
    tracing::debug,
};

use crate::{
    error::{Result, StoreError},
    store::{BlobMeta, BlobStore, PutOptions, validate_path},
};

struct StoredBlob {
    body: Bytes,
    uploaded_at: DateTime<Utc>,
}

/// Process-local store. Contents vanish with the process; used for tests and
/// throwaway gateways.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit upload time, overwriting any existing one.
    pub async fn put_at(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        uploaded_at: DateTime<Utc>,
    ) -> Result<BlobMeta> {
        validate_path(path)?;
        let body = body.into();
        let meta = meta_for(path, &body, uploaded_at);
        self.blobs
            .write()
            .await
            .insert(path.to_string(), StoredBlob { body, uploaded_at });
        Ok(meta)
    }

    /// Paths currently stored, in key order.
    pub async fn paths(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

fn meta_for(path: &str, body: &Bytes, uploaded_at: DateTime<Utc>) -> BlobMeta {
    BlobMeta {
        path: path.to_string(),
        uploaded_at,
        url: format!("memory://{path}"),
        size: body.len() as u64,
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, path: &str, body: Bytes, opts: PutOptions) -> Result<BlobMeta> {
        validate_path(path)?;
        let mut blobs = self.blobs.write().await;
        if !opts.allow_overwrite && blobs.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        let uploaded_at = Utc::now();
        let meta = meta_for(path, &body, uploaded_at);
        blobs.insert(path.to_string(), StoredBlob { body, uploaded_at });
        debug!(path, size = meta.size, "memory store: put");
        Ok(meta)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>> {
        let blobs = self.blobs.read().await;
        Ok(blobs
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, blob)| meta_for(path, &blob.body, blob.uploaded_at))
            .collect())
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|blob| blob.body.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, paths: &[String]) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        for path in paths {
            blobs.remove(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone};

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let store = MemoryStore::new();
        let meta = store
            .put("a/b.txt", Bytes::from_static(b"hi"), PutOptions::default())
            .await
            .unwrap();
        assert_eq!(meta.path, "a/b.txt");
        assert_eq!(meta.url, "memory://a/b.txt");
        assert_eq!(meta.size, 2);
        assert_eq!(store.get("a/b.txt").await.unwrap(), Bytes::from_static(b"hi"));
    }

    #[tokio::test]
    async fn put_without_overwrite_rejects_existing() {
        let store = MemoryStore::new();
        store
            .put("a/b.txt", Bytes::from_static(b"1"), PutOptions::default())
            .await
            .unwrap();
        let err = store
            .put("a/b.txt", Bytes::from_static(b"2"), PutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        store
            .put("a/b.txt", Bytes::from_static(b"3"), PutOptions::overwrite())
            .await
            .unwrap();
        assert_eq!(store.get("a/b.txt").await.unwrap(), Bytes::from_static(b"3"));
    }

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let store = MemoryStore::new();
        let t = Utc.timestamp_millis_opt(1_000).unwrap();
        store.put_at("buffer/a/1.ndjson", "x", t).await.unwrap();
        store.put_at("buffer/a/2.ndjson", "y", t).await.unwrap();
        store.put_at("buffer/ab/1.ndjson", "z", t).await.unwrap();
        store.put_at("exports/a/1.txt", "w", t).await.unwrap();

        let listed: Vec<_> = store
            .list("buffer/a/")
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.path)
            .collect();
        assert_eq!(listed, vec!["buffer/a/1.ndjson", "buffer/a/2.ndjson"]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_ignores_missing_paths() {
        let store = MemoryStore::new();
        let t = Utc.timestamp_millis_opt(1_000).unwrap();
        store.put_at("k/1", "x", t).await.unwrap();
        store
            .delete(&["k/1".to_string(), "k/404".to_string()])
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }
}
