//! Document store trait

use crate::{Document, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Databases reserved by the server for its own bookkeeping
pub const SYSTEM_DATABASES: &[&str] = &["admin", "config", "local"];

/// Whether a database name is one of the reserved system databases
pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}

/// A forward-only cursor over the documents of one collection.
///
/// The underlying server cursor is released when the stream is dropped, so
/// breaking out of a loop early or returning on an error cleans it up.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// A document store connection
///
/// One handle is passed explicitly into each export or import run. Pipelines
/// issue one operation at a time against it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the driver name (e.g., "mongodb", "memory")
    fn driver_name(&self) -> &str;

    /// List user databases, excluding `SYSTEM_DATABASES`
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// List the collections of a database
    async fn list_collections(&self, database: &str) -> Result<Vec<String>>;

    /// Whether a collection of that name exists in the database
    async fn collection_exists(&self, database: &str, collection: &str) -> Result<bool> {
        Ok(self
            .list_collections(database)
            .await?
            .iter()
            .any(|name| name == collection))
    }

    /// Open a cursor over every document of a collection, in store order
    async fn find_all(&self, database: &str, collection: &str) -> Result<DocumentStream>;

    /// Delete every document of a collection. Returns the number deleted.
    async fn delete_all(&self, database: &str, collection: &str) -> Result<u64>;

    /// Insert a batch of documents, creating the collection if needed.
    /// Returns the number inserted.
    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64>;

    /// Release the connection. Further calls fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
