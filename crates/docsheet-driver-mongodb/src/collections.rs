//! MongoDB database and collection listing
//!
//! This module provides the enumeration capabilities the backup pipelines
//! consume:
//! - List user databases on the server (system databases excluded)
//! - List collections in a database, with their kind

use crate::MongoDbConnection;
use docsheet_core::{DocsheetError, Result, is_system_database};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

/// Information about a MongoDB database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseInfo {
    /// The database name
    pub name: String,
    /// Size in bytes
    pub size_bytes: Option<u64>,
    /// Whether this is an empty database
    pub empty: bool,
}

impl DatabaseInfo {
    /// Create a new DatabaseInfo
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes: None,
            empty: false,
        }
    }

    /// Set size in bytes
    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size_bytes = Some(bytes);
        self
    }

    /// Set empty flag
    pub fn with_empty(mut self, empty: bool) -> Self {
        self.empty = empty;
        self
    }
}

/// Information about a MongoDB collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    /// The collection name
    pub name: String,
    /// The collection type (collection, view, system)
    pub collection_type: CollectionType,
}

impl CollectionInfo {
    /// Create a new CollectionInfo
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let collection_type = if name.starts_with("system.") {
            CollectionType::System
        } else {
            CollectionType::Collection
        };
        Self {
            name,
            collection_type,
        }
    }

    /// Set collection type
    pub fn with_type(mut self, collection_type: CollectionType) -> Self {
        self.collection_type = collection_type;
        self
    }

    /// Whether documents can be both read from and written back to it.
    ///
    /// Views are computed and `system.*` collections belong to the server.
    pub fn is_exportable(&self) -> bool {
        self.collection_type == CollectionType::Collection
    }
}

/// MongoDB collection types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Regular collection
    Collection,
    /// View (read-only, computed from other collections)
    View,
    /// System collection
    System,
}

impl CollectionType {
    /// Get the type string
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Collection => "collection",
            CollectionType::View => "view",
            CollectionType::System => "system",
        }
    }
}

impl std::fmt::Display for CollectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// List user databases on the server, system databases excluded
pub async fn list_databases(conn: &MongoDbConnection) -> Result<Vec<DatabaseInfo>> {
    conn.ensure_not_closed()?;

    let specs = conn.client().list_databases().await.map_err(|e| {
        DocsheetError::StoreUnavailable(format!("Failed to list databases: {}", e))
    })?;

    let databases = specs
        .into_iter()
        .filter(|spec| !is_system_database(&spec.name))
        .map(|spec| {
            DatabaseInfo::new(spec.name)
                .with_size(spec.size_on_disk)
                .with_empty(spec.empty)
        })
        .collect();

    Ok(databases)
}

/// List every collection of a database, sorted by name
pub async fn list_collections(
    conn: &MongoDbConnection,
    database: &str,
) -> Result<Vec<CollectionInfo>> {
    conn.ensure_not_closed()?;

    let specs: Vec<_> = conn
        .db(database)
        .list_collections()
        .await
        .map_err(|e| {
            DocsheetError::StoreUnavailable(format!("Failed to list collections: {}", e))
        })?
        .try_collect()
        .await
        .map_err(|e| {
            DocsheetError::StoreUnavailable(format!("Failed to list collections: {}", e))
        })?;

    let mut collections: Vec<CollectionInfo> = specs
        .into_iter()
        .map(|spec| {
            let info = CollectionInfo::new(spec.name);
            match spec.collection_type {
                mongodb::results::CollectionType::View => info.with_type(CollectionType::View),
                _ => info,
            }
        })
        .collect();
    collections.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(collections)
}
