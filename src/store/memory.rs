//! In-memory document store for tests and embedding.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::query;
use super::traits::{Document, DocumentStore, Fields, Query, WriteOp, merge_fields};
use crate::error::StoreError;

type Key = (String, String);

/// `DocumentStore` backed by an ordered map.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<Key, Fields>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful write calls (`set`, `update`, `batch_write`).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of documents currently stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.docs
            .read()
            .await
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn query(&self, q: &Query) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        let candidates = docs
            .iter()
            .filter(|((c, _), _)| *c == q.collection)
            .map(|((_, id), fields)| Document::new(id.clone(), fields.clone()))
            .collect();
        Ok(query::apply(candidates, q))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let entry = docs
            .entry((collection.to_string(), id.to_string()))
            .or_default();
        merge_fields(entry, fields);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(collection, id, "Document set");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let entry = docs
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_fields(entry, fields);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(collection, id, "Document updated");
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        // Single lock for the whole batch, so it is all-or-nothing to readers.
        let mut docs = self.docs.write().await;
        for op in ops {
            let entry = docs.entry((op.collection, op.id)).or_default();
            merge_fields(entry, op.fields);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
