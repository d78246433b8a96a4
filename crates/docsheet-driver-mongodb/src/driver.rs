//! MongoDB driver implementation

use async_trait::async_trait;
use bson::doc;
use docsheet_core::{Document, DocumentStore, DocumentStream, DocsheetError, Result};
use futures::StreamExt;
use mongodb::{Client, options::ClientOptions};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::collections;
use crate::conversion::{document_from_bson, document_to_bson};

/// Default connection string offered when none is configured
pub const DEFAULT_URI: &str = "mongodb://localhost:27017/";

const APP_NAME: &str = "docsheet";

/// MongoDB database driver
///
/// Turns a connection string into a live `MongoDbConnection`.
pub struct MongoDbDriver;

impl MongoDbDriver {
    /// Create a new MongoDB driver instance
    pub fn new() -> Self {
        tracing::debug!("MongoDB driver initialized");
        Self
    }

    /// Connect to the server named by `uri` and verify it answers `ping`
    #[tracing::instrument(skip(self, uri), fields(host = %redact_uri(uri)))]
    pub async fn connect(&self, uri: &str) -> Result<MongoDbConnection> {
        tracing::debug!("connecting to MongoDB");

        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            DocsheetError::StoreUnavailable(format!("Failed to parse MongoDB options: {}", e))
        })?;
        client_options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(client_options).map_err(|e| {
            DocsheetError::StoreUnavailable(format!("Failed to create MongoDB client: {}", e))
        })?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                DocsheetError::StoreUnavailable(format!("Failed to connect to MongoDB: {}", e))
            })?;

        tracing::info!("connected to MongoDB");
        Ok(MongoDbConnection::new(client))
    }
}

impl Default for MongoDbDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip credentials from a connection string for logging
pub fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}

/// MongoDB connection wrapper implementing the DocumentStore trait
pub struct MongoDbConnection {
    client: Client,
    closed: AtomicBool,
}

impl MongoDbConnection {
    /// Wrap an already configured client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            closed: AtomicBool::new(false),
        }
    }

    /// Get the MongoDB client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a database handle
    pub fn db(&self, database: &str) -> mongodb::Database {
        self.client.database(database)
    }

    fn collection(&self, database: &str, collection: &str) -> mongodb::Collection<bson::Document> {
        self.db(database).collection(collection)
    }

    pub(crate) fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DocsheetError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoDbConnection {
    fn driver_name(&self) -> &str {
        "mongodb"
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        let databases = collections::list_databases(self).await?;
        Ok(databases.into_iter().map(|db| db.name).collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        let collections = collections::list_collections(self, database).await?;
        Ok(collections
            .into_iter()
            .filter(|c| c.is_exportable())
            .map(|c| c.name)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self, database: &str, collection: &str) -> Result<DocumentStream> {
        self.ensure_not_closed()?;

        let cursor = self
            .collection(database, collection)
            .find(doc! {})
            .await
            .map_err(|e| DocsheetError::StoreUnavailable(format!("MongoDB find failed: {}", e)))?;

        Ok(cursor
            .map(|result| {
                result.map(|d| document_from_bson(&d)).map_err(|e| {
                    DocsheetError::StoreUnavailable(format!("MongoDB cursor failed: {}", e))
                })
            })
            .boxed())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all(&self, database: &str, collection: &str) -> Result<u64> {
        self.ensure_not_closed()?;

        let result = self
            .collection(database, collection)
            .delete_many(doc! {})
            .await
            .map_err(|e| {
                DocsheetError::StoreUnavailable(format!("MongoDB delete failed: {}", e))
            })?;

        tracing::debug!(deleted = result.deleted_count, "cleared collection");
        Ok(result.deleted_count)
    }

    #[tracing::instrument(skip(self, documents), fields(count = documents.len()))]
    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64> {
        self.ensure_not_closed()?;

        if documents.is_empty() {
            return Ok(0);
        }

        let batch = documents
            .iter()
            .map(document_to_bson)
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .collection(database, collection)
            .insert_many(batch)
            .await
            .map_err(|e| {
                DocsheetError::StoreUnavailable(format!("MongoDB insert failed: {}", e))
            })?;

        Ok(result.inserted_ids.len() as u64)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.client.clone().shutdown().await;
            tracing::debug!("MongoDB connection closed");
        }
        Ok(())
    }
}
