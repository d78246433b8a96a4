//! Export of collections into spreadsheet artifacts
//!
//! Every collection of a database becomes one sheet. The header of a sheet is
//! taken from the field names of the first document the cursor yields, and
//! every document, the first included, becomes one row under it. Fields that
//! later documents add are not part of the header and are not exported.

use chrono::Local;
use futures::TryStreamExt;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::artifact::{ArtifactError, artifact_file_name};
use crate::value_encoding::encode_row;
use crate::workbook::{Sheet, Workbook};
use crate::xlsx::write_workbook;
use docsheet_core::{DocsheetError, DocumentStore};

/// Default directory artifacts are written to
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Errors during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] DocsheetError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Failed to create backup directory {}: {source}", .path.display())]
    BackupDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Options for export operations
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory the artifact is written to; created when missing
    pub backup_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
        }
    }
}

impl ExportOptions {
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }
}

/// Progress callback for export operations
pub type ExportProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress information
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current phase of export
    pub phase: ExportPhase,
    /// Database being exported
    pub database: String,
    /// Collection the progress refers to
    pub current_collection: Option<String>,
    /// Total number of collections
    pub total_collections: usize,
    /// Number of collections completed
    pub collections_completed: usize,
    /// Documents exported for the current collection
    pub documents_exported: u64,
}

/// Phases of the export process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Listing collections
    Starting,
    /// A collection has been written to its sheet
    CollectionExported,
    /// Writing the artifact file
    Writing,
    /// Export complete
    Complete,
}

/// Documents exported from one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub documents: u64,
}

/// Outcome of exporting one database
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    /// Source database
    pub database: String,
    /// Artifact written
    pub artifact: PathBuf,
    /// Collections in sheet order
    pub collections: Vec<CollectionSummary>,
}

impl ExportResult {
    /// Documents exported across all collections
    pub fn total_documents(&self) -> u64 {
        self.collections.iter().map(|c| c.documents).sum()
    }
}

/// Exports collections of a document store to artifacts
pub struct Exporter {
    store: Arc<dyn DocumentStore>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(store: Arc<dyn DocumentStore>, options: ExportOptions) -> Self {
        Self { store, options }
    }

    /// Read every document of a collection into a sheet named after it.
    ///
    /// An empty collection yields a sheet with no rows, not even a header.
    #[tracing::instrument(skip(self))]
    pub async fn export_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Sheet, ExportError> {
        let mut sheet = Sheet::new(collection);
        let mut cursor = self.store.find_all(database, collection).await?;

        let mut header: Option<Vec<String>> = None;
        let mut truncated = 0u64;
        while let Some(document) = cursor.try_next().await? {
            let header = header.get_or_insert_with(|| {
                let fields: Vec<String> = document.keys().map(str::to_string).collect();
                sheet.push_header(&fields);
                fields
            });
            if document.keys().any(|k| !header.iter().any(|h| h == k)) {
                truncated += 1;
            }
            sheet.push_row(encode_row(header, &document));
        }

        if truncated > 0 {
            tracing::warn!(
                database,
                collection,
                documents = truncated,
                "documents have fields missing from the header; those fields were not exported"
            );
        }
        tracing::debug!(
            database,
            collection,
            documents = sheet.data_row_count(),
            "collection exported"
        );
        Ok(sheet)
    }

    /// Export every collection of a database into a new artifact
    pub async fn export_database(&self, database: &str) -> Result<ExportResult, ExportError> {
        self.export_database_with_progress(database, Box::new(|_| {}))
            .await
    }

    /// Export with progress callback
    pub async fn export_database_with_progress(
        &self,
        database: &str,
        progress: ExportProgressCallback,
    ) -> Result<ExportResult, ExportError> {
        self.export_database_reporting(database, &progress).await
    }

    #[tracing::instrument(skip(self, progress))]
    async fn export_database_reporting(
        &self,
        database: &str,
        progress: &ExportProgressCallback,
    ) -> Result<ExportResult, ExportError> {
        let collections = self.store.list_collections(database).await?;
        let report = |phase, current: Option<&str>, completed, documents| {
            progress(ExportProgress {
                phase,
                database: database.to_string(),
                current_collection: current.map(str::to_string),
                total_collections: collections.len(),
                collections_completed: completed,
                documents_exported: documents,
            })
        };
        report(ExportPhase::Starting, None, 0, 0);

        let mut workbook = Workbook::new();
        let mut summaries = Vec::with_capacity(collections.len());
        for (index, collection) in collections.iter().enumerate() {
            let sheet = self.export_collection(database, collection).await?;
            let documents = sheet.data_row_count() as u64;
            summaries.push(CollectionSummary {
                name: collection.clone(),
                documents,
            });
            workbook.push(sheet);
            report(
                ExportPhase::CollectionExported,
                Some(collection.as_str()),
                index + 1,
                documents,
            );
        }

        let dir = &self.options.backup_dir;
        std::fs::create_dir_all(dir).map_err(|source| ExportError::BackupDir {
            path: dir.clone(),
            source,
        })?;
        let artifact = dir.join(artifact_file_name(database, &Local::now()));

        report(ExportPhase::Writing, None, collections.len(), 0);
        write_workbook(&workbook, &artifact)?;
        report(ExportPhase::Complete, None, collections.len(), 0);

        let result = ExportResult {
            database: database.to_string(),
            artifact,
            collections: summaries,
        };
        tracing::info!(
            database,
            artifact = %result.artifact.display(),
            collections = result.collections.len(),
            documents = result.total_documents(),
            "database exported"
        );
        Ok(result)
    }

    /// Export several databases, one artifact each, in the given order.
    ///
    /// `progress` sees every phase of every database in turn.
    pub async fn export_databases(
        &self,
        databases: &[String],
        progress: ExportProgressCallback,
    ) -> Result<Vec<ExportResult>, ExportError> {
        let mut results = Vec::with_capacity(databases.len());
        for database in databases {
            results.push(self.export_database_reporting(database, &progress).await?);
        }
        Ok(results)
    }
}
