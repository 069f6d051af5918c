//! Todo API
//!
//! HTTP resource API for todo items backed by a document store.

pub mod codec;
pub mod config;
pub mod gateway;
pub mod models;
pub mod server;
pub mod store;

pub use config::{Config, ConfigError, StoreBackend};
pub use gateway::{GatewayError, TodoGateway};
pub use models::{ResourceId, ResourceIdError, TodoItem, TodoPayload};
pub use store::{Document, DocumentStore, MemoryStore, SqliteStore, StoreError};

use std::sync::Arc;

/// Open the document store selected by `config`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store.value {
        StoreBackend::Sqlite => {
            let store =
                SqliteStore::open(&config.database_path.value, config.collection.value.clone())
                    .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
