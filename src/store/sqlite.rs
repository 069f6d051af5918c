//! SQLite-backed document store.
//!
//! Documents live in a single `documents` table, partitioned by collection
//! name. Bodies are JSON text; identifiers are the 16 raw id bytes.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{Document, DocumentStore, StoreError};
use crate::models::ResourceId;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and run migrations.
    pub async fn open(path: &Path, collection: impl Into<String>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!(
                        "failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool, collection).await
    }

    /// Use an existing pool. Migrations are applied before returning.
    pub async fn with_pool(
        pool: SqlitePool,
        collection: impl Into<String>,
    ) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;

        let collection = collection.into();
        tracing::debug!(collection = %collection, "SQLite document store ready");

        Ok(Self { pool, collection })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn parse_body(id: &ResourceId, body: &str) -> Result<Document, StoreError> {
        serde_json::from_str(body)
            .map_err(|e| StoreError::Corrupt(format!("document {}: {}", id, e)))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_all(&self) -> Result<Vec<(ResourceId, Document)>, StoreError> {
        let rows: Vec<(Vec<u8>, String)> = sqlx::query_as(
            "SELECT id, body FROM documents WHERE collection = ? ORDER BY rowid",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for (raw_id, body) in rows {
            let id = ResourceId::from_slice(&raw_id)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let doc = Self::parse_body(&id, &body)?;
            docs.push((id, doc));
        }
        Ok(docs)
    }

    async fn find_by_id(&self, id: &ResourceId) -> Result<Option<Document>, StoreError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(&self.collection)
                .bind(&id.as_bytes()[..])
                .fetch_optional(&self.pool)
                .await?;

        body.map(|b| Self::parse_body(id, &b)).transpose()
    }

    async fn insert(&self, id: &ResourceId, doc: Document) -> Result<(), StoreError> {
        let body = Value::Object(doc).to_string();

        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(&self.collection)
            .bind(&id.as_bytes()[..])
            .bind(&body)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateKey(*id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_id(&self, id: &ResourceId, set: Document) -> Result<bool, StoreError> {
        let patch = Value::Object(set).to_string();

        let result = sqlx::query(
            "UPDATE documents SET body = json_patch(body, ?) WHERE collection = ? AND id = ?",
        )
        .bind(&patch)
        .bind(&self.collection)
        .bind(&id.as_bytes()[..])
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &ResourceId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(&self.collection)
            .bind(&id.as_bytes()[..])
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
