//! Key-value persistence boundary.
//!
//! The vault does not own a storage engine; the host injects anything that
//! implements [`KeyValueStore`]. Three logical records exist: the salt,
//! the password verifier, and the application-data blob.
//!
//! [`BridgedStore`] wraps a backend with a one-time compatibility shim:
//! before the first read of a key in this process, a legacy flat-file
//! location is probed and a value found there is moved into the backend.
//! That relocation is best effort; its failures are logged and swallowed
//! so they can never block a read.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::flat::FlatStore;

/// Async string-keyed store, one value per key. Implementations must be
/// durable once `put` resolves; callers await before treating a save as
/// committed.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// In-memory backend. Cheap to clone (Arc internally); used in tests and
/// by hosts that keep their own persistence outside the vault.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.records.lock().await.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.records.lock().await.remove(key);
        Ok(())
    }
}

/// Backend wrapper that relocates records from a legacy flat location on
/// the first access of each key, then serves everything from `inner`.
///
/// A key is probed at most once per process. Writes and deletes also mark
/// their key probed, so a value written through this store is never
/// clobbered by a later probe.
#[derive(Clone)]
pub struct BridgedStore<S, F> {
    inner: S,
    flat: F,
    probed: Arc<Mutex<HashSet<String>>>,
}

impl<S: KeyValueStore, F: FlatStore> BridgedStore<S, F> {
    pub fn new(inner: S, flat: F) -> Self {
        Self {
            inner,
            flat,
            probed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    async fn probe_once(&self, key: &str) {
        let mut probed = self.probed.lock().await;
        if !probed.insert(key.to_string()) {
            return;
        }

        let found = match self.flat.get(key) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("legacy location probe for {key} failed: {e}");
                return;
            }
        };
        let Some(value) = found else { return };

        match self.inner.get(key).await {
            Ok(Some(_)) => {
                // The backend already has an authoritative value; leave the
                // stale flat copy where it is.
            }
            Ok(None) => {
                if let Err(e) = self.inner.put(key, value.as_bytes()).await {
                    tracing::warn!("relocating legacy record {key} failed to write: {e}");
                    return;
                }
                if let Err(e) = self.flat.remove(key) {
                    tracing::warn!("relocated legacy record {key} but could not delete source: {e}");
                }
                tracing::info!("relocated legacy record {key} into the key-value store");
            }
            Err(e) => {
                tracing::warn!("legacy relocation check for {key} failed: {e}");
            }
        }
    }
}

#[async_trait]
impl<S: KeyValueStore, F: FlatStore> KeyValueStore for BridgedStore<S, F> {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.probe_once(key).await;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.probed.lock().await.insert(key.to_string());
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.probed.lock().await.insert(key.to_string());
        self.inner.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::FlatFile;
    use tempfile::tempdir;

    struct BrokenFlat;

    impl FlatStore for BrokenFlat {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("flat location unreadable")
        }
        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("flat location unreadable")
        }
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.put("k", b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v");
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relocates_flat_value_on_first_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(&path, r#"{"vault.verifier":"b64-blob"}"#).unwrap();

        let inner = MemoryStore::new();
        let store = BridgedStore::new(inner.clone(), FlatFile::new(&path));

        assert_eq!(store.get("vault.verifier").await.unwrap().unwrap(), b"b64-blob");
        // Moved, not copied: the flat location no longer holds the record.
        assert!(FlatFile::new(&path).get("vault.verifier").unwrap().is_none());
        // Subsequent reads come straight from the backend.
        assert_eq!(inner.get("vault.verifier").await.unwrap().unwrap(), b"b64-blob");
    }

    #[tokio::test]
    async fn fresh_write_is_not_clobbered_by_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(&path, r#"{"vault.app_data":"stale"}"#).unwrap();

        let store = BridgedStore::new(MemoryStore::new(), FlatFile::new(&path));
        store.put("vault.app_data", b"fresh").await.unwrap();
        assert_eq!(store.get("vault.app_data").await.unwrap().unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn flat_failures_never_block_reads() {
        let store = BridgedStore::new(MemoryStore::new(), BrokenFlat);
        store.put("k", b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v");
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
