//! Persistence layer: transactional JSON document storage.
//!
//! Provides the [`DocumentStore`] trait for keyed JSON documents grouped in
//! [`Collection`]s, and [`StoreTxn`], a unit of work whose reads lock the
//! documents they touch until commit. Two implementations conform:
//!
//! - [`MemoryStore`]: in-process map with a single writer lock, optionally
//!   snapshotted to a JSON file after every commit.
//! - [`PostgresStore`]: JSONB rows in PostgreSQL with `SELECT ... FOR UPDATE`.
//!
//! Services never depend on which one is in use.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use memory::MemoryStore;
pub use models::{CodeIndexEntry, Collection, Snapshot, StoreNameEntry};
pub use postgres::PostgresStore;

use crate::config::{LedgerConfig, StorageBackend};
use crate::error::LedgerError;

/// Keyed JSON document storage with transactional writes.
///
/// Reads outside a transaction observe committed state only.
#[async_trait]
pub trait DocumentStore: fmt::Debug + Send + Sync {
    /// Reads one committed document.
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError>;

    /// Reads every committed document of a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<serde_json::Value>, LedgerError>;

    /// Opens a unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTxn>, LedgerError>;
}

/// A unit of work against a [`DocumentStore`].
///
/// Documents read through [`StoreTxn::get`] stay locked against other
/// transactions until the transaction ends. Writes are invisible to
/// everyone else until [`StoreTxn::commit`]; dropping the transaction
/// without committing discards them.
#[async_trait]
pub trait StoreTxn: fmt::Debug + Send {
    /// Reads and locks one document, observing this transaction's writes.
    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError>;

    /// Reads every document of a collection, observing this transaction's writes.
    async fn list(&mut self, collection: Collection)
    -> Result<Vec<serde_json::Value>, LedgerError>;

    /// Writes a document only if no document holds its key, observing this
    /// transaction's writes. Returns `false` and writes nothing otherwise.
    ///
    /// A concurrent transaction inserting the same key is either seen here
    /// or makes this insert report `false`; creations never overwrite.
    async fn insert(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<bool, LedgerError>;

    /// Inserts or replaces a document.
    async fn put(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<(), LedgerError>;

    /// Removes a document. Returns `false` if it did not exist.
    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, LedgerError>;

    /// Makes every write of this transaction visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;
}

/// Opens the adapter selected by the configuration.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] if the snapshot file cannot be read or
/// the database cannot be reached.
pub async fn open_store(config: &LedgerConfig) -> Result<Arc<dyn DocumentStore>, LedgerError> {
    let store: Arc<dyn DocumentStore> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(MemoryStore::open(&config.data_path).await?),
        StorageBackend::Postgres => Arc::new(PostgresStore::connect(config).await?),
    };
    tracing::info!(backend = ?config.storage_backend, "storage ready");
    Ok(store)
}

/// Reads and deserializes one committed document.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure or a malformed document.
pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, LedgerError> {
    store
        .get(collection, id)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(LedgerError::from)
}

/// Reads and deserializes every committed document of a collection.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure or a malformed document.
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<Vec<T>, LedgerError> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(LedgerError::from))
        .collect()
}

/// Reads, locks and deserializes one document inside a transaction.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure or a malformed document.
pub async fn load<T: DeserializeOwned>(
    txn: &mut dyn StoreTxn,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, LedgerError> {
    txn.get(collection, id)
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(LedgerError::from)
}

/// Reads and deserializes every document of a collection inside a transaction.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure or a malformed document.
pub async fn load_all<T: DeserializeOwned>(
    txn: &mut dyn StoreTxn,
    collection: Collection,
) -> Result<Vec<T>, LedgerError> {
    txn.list(collection)
        .await?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(LedgerError::from))
        .collect()
}

/// Serializes and writes one document inside a transaction.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
pub async fn save<T: Serialize + Sync>(
    txn: &mut dyn StoreTxn,
    collection: Collection,
    id: &str,
    value: &T,
) -> Result<(), LedgerError> {
    let doc = serde_json::to_value(value)?;
    txn.put(collection, id, doc).await
}

/// Serializes and writes a new document, refusing to replace one.
///
/// Returns `false` if the key is already taken.
///
/// # Errors
///
/// Returns [`LedgerError::Storage`] on adapter failure.
pub async fn insert<T: Serialize + Sync>(
    txn: &mut dyn StoreTxn,
    collection: Collection,
    id: &str,
    value: &T,
) -> Result<bool, LedgerError> {
    let doc = serde_json::to_value(value)?;
    txn.insert(collection, id, doc).await
}

/// Like [`insert`], for freshly generated keys where a taken key means
/// another writer got there first.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidState`] if the key is taken and
/// [`LedgerError::Storage`] on adapter failure.
pub async fn create<T: Serialize + Sync>(
    txn: &mut dyn StoreTxn,
    collection: Collection,
    id: &str,
    value: &T,
) -> Result<(), LedgerError> {
    if insert(txn, collection, id, value).await? {
        Ok(())
    } else {
        Err(LedgerError::InvalidState(format!("{collection} {id} already exists")))
    }
}
