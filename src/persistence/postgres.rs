//! PostgreSQL implementation of the persistence layer.
//!
//! Every document is a JSONB row in the `documents` table keyed by
//! `(collection, id)`. Reads inside a transaction use `SELECT ... FOR UPDATE`
//! so two transactions touching the same entity are serialized by the
//! database's row locks.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::Collection;
use super::{DocumentStore, StoreTxn};
use crate::config::LedgerConfig;
use crate::error::LedgerError;

const CREATE_DOCUMENTS: &str = "CREATE TABLE IF NOT EXISTS documents (\
     collection TEXT NOT NULL, \
     id TEXT NOT NULL, \
     body JSONB NOT NULL, \
     updated_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
     PRIMARY KEY (collection, id))";

const UPSERT_DOCUMENT: &str = "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
     ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()";

const INSERT_DOCUMENT: &str = "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
     ON CONFLICT (collection, id) DO NOTHING";

/// PostgreSQL-backed [`DocumentStore`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with the pool settings from `config` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::Storage`] if the database is unreachable or
    /// the schema cannot be created.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Creates the `documents` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::Storage`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), LedgerError> {
        sqlx::query(CREATE_DOCUMENTS).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<serde_json::Value>, LedgerError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTxn>, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTxn { tx }))
    }
}

/// Transaction over a [`PostgresStore`]; rolls back when dropped uncommitted.
pub struct PostgresTxn {
    tx: Transaction<'static, Postgres>,
}

impl fmt::Debug for PostgresTxn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTxn").finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTxn for PostgresTxn {
    async fn get(
        &mut self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<serde_json::Value>, LedgerError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn list(
        &mut self,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, LedgerError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn insert(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<bool, LedgerError> {
        // A conflicting uncommitted insert blocks here until it resolves.
        let result = sqlx::query(INSERT_DOCUMENT)
            .bind(collection.as_str())
            .bind(id)
            .bind(doc)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn put(
        &mut self,
        collection: Collection,
        id: &str,
        doc: serde_json::Value,
    ) -> Result<(), LedgerError> {
        sqlx::query(UPSERT_DOCUMENT)
            .bind(collection.as_str())
            .bind(id)
            .bind(doc)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, LedgerError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx.commit().await?;
        Ok(())
    }
}
