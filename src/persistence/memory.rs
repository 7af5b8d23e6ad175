//! In-process document store with optional JSON file durability.
//!
//! Committed state lives in a [`Snapshot`] behind a [`RwLock`]. Writers are
//! serialized by a single writer [`Mutex`] held for the whole lifetime of a
//! [`MemoryTxn`], so a transaction's read-check-write can never interleave
//! with another one. On commit the staged writes are merged into a copy of
//! the committed snapshot, written to disk (temp file + rename) when a path
//! is configured, and only then swapped in.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::models::{Collection, Snapshot};
use super::{DocumentStore, StoreTxn};
use crate::error::LedgerError;

/// In-process [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    committed: Arc<RwLock<Snapshot>>,
    writer: Arc<Mutex<()>>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty, volatile store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: Arc::new(RwLock::new(Snapshot::new())),
            writer: Arc::new(Mutex::new(())),
            path: None,
        }
    }

    /// Opens a store persisted at `path`, loading it if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the file exists but cannot be
    /// read or does not contain a valid snapshot.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes).map_err(|e| {
                LedgerError::Storage(format!("corrupt snapshot {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::new(),
            Err(e) => {
                return Err(LedgerError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };
        let documents: usize = snapshot.values().map(BTreeMap::len).sum();
        tracing::info!(path = %path.display(), documents, "snapshot loaded");

        Ok(Self {
            committed: Arc::new(RwLock::new(snapshot)),
            writer: Arc::new(Mutex::new(())),
            path: Some(path),
        })
    }

    /// Returns the snapshot file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError> {
        let committed = self.committed.read().await;
        Ok(committed
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<serde_json::Value>, LedgerError> {
        let committed = self.committed.read().await;
        Ok(committed
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTxn>, LedgerError> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        Ok(Box::new(MemoryTxn {
            _guard: guard,
            committed: Arc::clone(&self.committed),
            path: self.path.clone(),
            staged: BTreeMap::new(),
        }))
    }
}

/// Transaction over a [`MemoryStore`]; holds the writer lock until dropped.
pub struct MemoryTxn {
    _guard: OwnedMutexGuard<()>,
    committed: Arc<RwLock<Snapshot>>,
    path: Option<PathBuf>,
    /// `None` marks a staged delete.
    staged: BTreeMap<(Collection, String), Option<serde_json::Value>>,
}

impl fmt::Debug for MemoryTxn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTxn")
            .field("path", &self.path)
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTxn for MemoryTxn {
    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError> {
        if let Some(staged) = self.staged.get(&(collection, id.to_string())) {
            return Ok(staged.clone());
        }
        let committed = self.committed.read().await;
        Ok(committed
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(
        &mut self,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, LedgerError> {
        let committed = self.committed.read().await;
        let mut docs = committed.get(&collection).cloned().unwrap_or_default();
        drop(committed);

        for ((staged_collection, id), doc) in &self.staged {
            if *staged_collection != collection {
                continue;
            }
            match doc {
                Some(doc) => {
                    docs.insert(id.clone(), doc.clone());
                }
                None => {
                    docs.remove(id);
                }
            }
        }
        Ok(docs.into_values().collect())
    }

    async fn insert(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<bool, LedgerError> {
        if self.get(collection, id).await?.is_some() {
            return Ok(false);
        }
        self.staged.insert((collection, id.to_string()), Some(doc));
        Ok(true)
    }

    async fn put(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<(), LedgerError> {
        self.staged.insert((collection, id.to_string()), Some(doc));
        Ok(())
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, LedgerError> {
        let existed = self.get(collection, id).await?.is_some();
        self.staged.insert((collection, id.to_string()), None);
        Ok(existed)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let this = *self;
        if this.staged.is_empty() {
            return Ok(());
        }

        let mut committed = this.committed.write().await;
        let mut next = committed.clone();
        for ((collection, id), doc) in this.staged {
            let docs = next.entry(collection).or_default();
            match doc {
                Some(doc) => {
                    docs.insert(id, doc);
                }
                None => {
                    docs.remove(&id);
                }
            }
        }

        if let Some(path) = &this.path {
            write_snapshot(path, &next).await?;
        }
        *committed = next;
        Ok(())
    }
}

/// Writes a snapshot atomically: temp file in the same directory, then rename.
async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), LedgerError> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            LedgerError::Storage(format!("cannot create {}: {e}", dir.display()))
        })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger.json".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()));

    if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        tracing::warn!(path = %tmp.display(), error = %e, "snapshot write failed");
        return Err(LedgerError::Storage(format!(
            "cannot write {}: {e}",
            tmp.display()
        )));
    }
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "snapshot rename failed");
        LedgerError::Storage(format!("cannot replace {}: {e}", path.display()))
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("vista-ledger-{}", uuid::Uuid::new_v4()))
            .join("ledger.json")
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        let put = txn
            .put(Collection::Members, "7777777777", json!({ "name": "Ramesh" }))
            .await;
        assert!(put.is_ok());

        let seen_inside = txn.get(Collection::Members, "7777777777").await;
        assert!(matches!(seen_inside, Ok(Some(_))));
        drop(txn);

        let seen_outside = store.get(Collection::Members, "7777777777").await;
        assert!(matches!(seen_outside, Ok(None)));
    }

    #[tokio::test]
    async fn commit_publishes_writes_and_deletes() {
        let store = MemoryStore::new();
        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        let _ = txn.put(Collection::Banners, "B1", json!({ "id": "B1" })).await;
        let _ = txn.put(Collection::Banners, "B2", json!({ "id": "B2" })).await;
        assert!(txn.commit().await.is_ok());

        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(matches!(txn.delete(Collection::Banners, "B1").await, Ok(true)));
        assert!(matches!(txn.delete(Collection::Banners, "B9").await, Ok(false)));
        let listed = txn.list(Collection::Banners).await.unwrap_or_default();
        assert_eq!(listed, vec![json!({ "id": "B2" })]);
        assert!(txn.commit().await.is_ok());

        let listed = store.list(Collection::Banners).await.unwrap_or_default();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn insert_never_replaces() {
        let store = MemoryStore::new();
        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        let first = txn
            .insert(Collection::Members, "7777777777", json!({ "name": "Ramesh" }))
            .await;
        assert!(matches!(first, Ok(true)));
        let staged_clash = txn
            .insert(Collection::Members, "7777777777", json!({ "name": "Suresh" }))
            .await;
        assert!(matches!(staged_clash, Ok(false)));
        assert!(txn.commit().await.is_ok());

        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        let committed_clash = txn
            .insert(Collection::Members, "7777777777", json!({ "name": "Suresh" }))
            .await;
        assert!(matches!(committed_clash, Ok(false)));
        assert!(txn.commit().await.is_ok());

        let doc = store.get(Collection::Members, "7777777777").await;
        assert!(matches!(doc, Ok(Some(v)) if v == json!({ "name": "Ramesh" })));
    }

    #[tokio::test]
    async fn transactions_are_serialized() {
        let store = MemoryStore::new();
        let Ok(first) = store.begin().await else {
            panic!("begin failed");
        };

        let contender = store.clone();
        let waiting = tokio::spawn(async move { contender.begin().await.map(|_| ()) });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(first);
        let joined = tokio::time::timeout(Duration::from_secs(1), waiting).await;
        assert!(matches!(joined, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = temp_path();
        let Ok(store) = MemoryStore::open(&path).await else {
            panic!("open failed");
        };
        let Ok(mut txn) = store.begin().await else {
            panic!("begin failed");
        };
        let _ = txn
            .put(Collection::Invoices, "INV-1", json!({ "amount": 5000.0 }))
            .await;
        assert!(txn.commit().await.is_ok());

        let Ok(reopened) = MemoryStore::open(&path).await else {
            panic!("reopen failed");
        };
        let doc = reopened.get(Collection::Invoices, "INV-1").await;
        assert!(matches!(doc, Ok(Some(v)) if v == json!({ "amount": 5000.0 })));

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_storage_error() {
        let path = temp_path();
        if let Some(dir) = path.parent() {
            let _ = tokio::fs::create_dir_all(dir).await;
        }
        let _ = tokio::fs::write(&path, b"not json").await;

        let opened = MemoryStore::open(&path).await;
        assert!(matches!(opened, Err(LedgerError::Storage(_))));

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }
}
