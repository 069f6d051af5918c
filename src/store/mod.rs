//! Document store interface and backends.
//!
//! A store holds schema-less documents in a single collection, keyed by
//! [`ResourceId`]. Implementations must be safe for concurrent use from many
//! in-flight requests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ResourceId;

/// A generic key/value document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Errors reported at the store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Document {0} already exists")]
    DuplicateKey(ResourceId),

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Operations the gateway needs from a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in store-native order.
    async fn find_all(&self) -> Result<Vec<(ResourceId, Document)>, StoreError>;

    async fn find_by_id(&self, id: &ResourceId) -> Result<Option<Document>, StoreError>;

    async fn insert(&self, id: &ResourceId, doc: Document) -> Result<(), StoreError>;

    /// Set the given fields on the matching document.
    ///
    /// Returns `false` if no document matched.
    async fn update_by_id(&self, id: &ResourceId, set: Document) -> Result<bool, StoreError>;

    /// Returns `false` if no document matched.
    async fn delete_by_id(&self, id: &ResourceId) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
