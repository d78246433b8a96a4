//! In-process document store
//!
//! Holds databases, collections and documents in memory. Documents are
//! returned in insertion order and receive an `ObjectId` when inserted
//! without one. As on a real server, `_id` is unique within a collection and
//! a batch holding a duplicate is rejected without inserting anything.

use async_trait::async_trait;
use futures::StreamExt;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    Document, DocumentStore, DocumentStream, DocsheetError, IDENTIFIER_FIELD, Result,
    is_system_database,
};

type Collections = IndexMap<String, Vec<Document>>;

/// A `DocumentStore` backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    databases: Mutex<IndexMap<String, Collections>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with documents, stored exactly as given
    pub fn with_collection(
        self,
        database: &str,
        collection: &str,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        self.databases
            .lock()
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        self
    }

    /// Snapshot of a collection's documents, or `None` if it does not exist
    pub fn documents(&self, database: &str, collection: &str) -> Option<Vec<Document>> {
        self.databases
            .lock()
            .get(database)
            .and_then(|collections| collections.get(collection))
            .cloned()
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DocsheetError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn driver_name(&self) -> &str {
        "memory"
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        self.ensure_not_closed()?;
        Ok(self
            .databases
            .lock()
            .keys()
            .filter(|name| !is_system_database(name))
            .cloned()
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        self.ensure_not_closed()?;
        Ok(self
            .databases
            .lock()
            .get(database)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_all(&self, database: &str, collection: &str) -> Result<DocumentStream> {
        self.ensure_not_closed()?;
        let documents = self.documents(database, collection).unwrap_or_default();
        Ok(futures::stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn delete_all(&self, database: &str, collection: &str) -> Result<u64> {
        self.ensure_not_closed()?;
        let mut databases = self.databases.lock();
        let deleted = databases
            .get_mut(database)
            .and_then(|collections| collections.get_mut(collection))
            .map(|documents| {
                let count = documents.len() as u64;
                documents.clear();
                count
            })
            .unwrap_or(0);
        Ok(deleted)
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64> {
        self.ensure_not_closed()?;
        let count = documents.len() as u64;
        let mut databases = self.databases.lock();
        let target = databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();
        let mut batch = Vec::with_capacity(documents.len());
        for mut document in documents {
            let id = document.ensure_id().clone();
            let taken = target
                .iter()
                .chain(batch.iter())
                .any(|existing: &Document| existing.get(IDENTIFIER_FIELD) == Some(&id));
            if taken {
                return Err(DocsheetError::StoreUnavailable(format!(
                    "duplicate key in {}.{}: _id {}",
                    database, collection, id
                )));
            }
            batch.push(document);
        }
        target.extend(batch);
        tracing::trace!(database, collection, count, "inserted documents");
        Ok(count)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
