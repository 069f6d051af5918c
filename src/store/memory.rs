//! In-memory document store.
//!
//! Used by tests and by servers configured with `store: memory`. Contents
//! are lost on exit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, StoreError};
use crate::models::ResourceId;

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<ResourceId, Document>>,
    /// When set, every operation fails with [`StoreError::Unavailable`].
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage (or recovery) of the backing store.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<(ResourceId, Document)>, StoreError> {
        self.check_online()?;
        let docs = self.docs.read().await;
        Ok(docs.iter().map(|(id, doc)| (*id, doc.clone())).collect())
    }

    async fn find_by_id(&self, id: &ResourceId) -> Result<Option<Document>, StoreError> {
        self.check_online()?;
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn insert(&self, id: &ResourceId, doc: Document) -> Result<(), StoreError> {
        self.check_online()?;
        let mut docs = self.docs.write().await;
        if docs.contains_key(id) {
            return Err(StoreError::DuplicateKey(*id));
        }
        docs.insert(*id, doc);
        Ok(())
    }

    async fn update_by_id(&self, id: &ResourceId, set: Document) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(doc) => {
                for (key, value) in set {
                    doc.insert(key, value);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &ResourceId) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.docs.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.check_online()?;
        Ok(self.docs.read().await.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
