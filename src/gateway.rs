//! Resource persistence gateway.
//!
//! Maps the five todo resource operations onto document store calls. The
//! gateway owns no state besides the injected store handle; every request is
//! handled independently and store failures are reported, never retried.
//!
//! Create is the only operation that is unsafe to retry: every call mints a
//! new identifier and inserts a new document.

use std::sync::Arc;
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::models::{ResourceId, ResourceIdError, TodoItem};
use crate::store::{DocumentStore, StoreError};

/// Errors returned by gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ResourceIdError),

    #[error("Todo item not found: {0}")]
    NotFound(ResourceId),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl GatewayError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MalformedPayload(_) => "malformed_payload",
            GatewayError::InvalidIdentifier(_) => "invalid_identifier",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<CodecError> for GatewayError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::MalformedPayload(msg) => GatewayError::MalformedPayload(msg),
            CodecError::InvalidIdentifier(e) => GatewayError::InvalidIdentifier(e),
            CodecError::CorruptDocument { .. } | CodecError::Encode(_) => {
                GatewayError::StoreUnavailable(StoreError::Corrupt(e.to_string()))
            }
        }
    }
}

/// Todo resource operations over a document store.
#[derive(Clone)]
pub struct TodoGateway {
    store: Arc<dyn DocumentStore>,
}

impl TodoGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The injected store handle.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Every todo item, in store order.
    pub async fn list(&self) -> Result<Vec<TodoItem>, GatewayError> {
        let docs = self.store.find_all().await?;

        let items = docs
            .into_iter()
            .map(|(id, doc)| codec::from_document(id, doc))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = items.len(), "Listed todo items");
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> Result<TodoItem, GatewayError> {
        let id = codec::parse_identifier(id)?;

        let doc = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or(GatewayError::NotFound(id))?;

        tracing::debug!(id = %id, "Fetched todo item");
        Ok(codec::from_document(id, doc)?)
    }

    /// Decode `body`, assign a fresh identifier and insert the item.
    pub async fn create(&self, body: &[u8]) -> Result<TodoItem, GatewayError> {
        let payload = codec::decode_create_payload(body)?;
        let id = ResourceId::new();

        self.store.insert(&id, codec::to_document(&payload)).await?;

        tracing::info!(id = %id, "Created todo item");
        Ok(TodoItem::from_payload(id, payload))
    }

    /// Overwrite title and description of an existing item.
    ///
    /// Replacing an item that does not exist is an error, not a no-op.
    pub async fn replace(&self, id: &str, body: &[u8]) -> Result<TodoItem, GatewayError> {
        let id = codec::parse_identifier(id)?;
        let payload = codec::decode_create_payload(body)?;

        let matched = self
            .store
            .update_by_id(&id, codec::build_update_document(&payload))
            .await?;
        if !matched {
            return Err(GatewayError::NotFound(id));
        }

        tracing::info!(id = %id, "Replaced todo item");
        Ok(TodoItem::from_payload(id, payload))
    }

    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let id = codec::parse_identifier(id)?;

        if !self.store.delete_by_id(&id).await? {
            return Err(GatewayError::NotFound(id));
        }

        tracing::info!(id = %id, "Deleted todo item");
        Ok(())
    }
}
