//! Import of spreadsheet artifacts back into collections
//!
//! Each sheet of an artifact is restored into the collection of the same name.
//! Restoring is a full replace: when a sheet yields at least one document, every
//! existing document of the target collection is deleted before the decoded
//! batch is inserted. Whether an existing collection may be replaced at all is
//! left to a caller supplied [`CollisionPolicy`].

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::artifact::{Artifact, ArtifactError};
use crate::value_encoding::{EncodingError, decode_row};
use crate::workbook::{Sheet, Workbook};
use crate::xlsx::read_workbook;
use docsheet_core::{DocsheetError, Document, DocumentStore};

/// Errors that abort a whole import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Store(#[from] DocsheetError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// A data row that could not be decoded
#[derive(Debug, Error, Clone, PartialEq)]
#[error("row {row}: {source}")]
pub struct RowError {
    /// Row number as a spreadsheet shows it; the header is row 1
    pub row: usize,
    #[source]
    pub source: EncodingError,
}

/// What to do with a sheet whose collection already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionDecision {
    /// Delete the existing documents and load the sheet
    Overwrite,
    /// Leave the collection as it is
    Skip,
}

/// Decides whether an existing collection may be replaced.
///
/// Consulted once per sheet, and only when the target collection exists.
/// Returning `None` (no answer) is treated as [`CollisionDecision::Skip`].
pub trait CollisionPolicy: Send + Sync {
    fn decide(&self, database: &str, collection: &str) -> Option<CollisionDecision>;
}

impl CollisionPolicy for CollisionDecision {
    fn decide(&self, _database: &str, _collection: &str) -> Option<CollisionDecision> {
        Some(*self)
    }
}

impl<F> CollisionPolicy for F
where
    F: Fn(&str, &str) -> Option<CollisionDecision> + Send + Sync,
{
    fn decide(&self, database: &str, collection: &str) -> Option<CollisionDecision> {
        self(database, collection)
    }
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Database to restore into instead of the one named by the artifact
    pub target_database: Option<String>,
}

impl ImportOptions {
    pub fn with_target_database(mut self, database: impl Into<String>) -> Self {
        self.target_database = Some(database.into());
        self
    }
}

/// Progress callback for import operations
pub type ImportProgressCallback = Box<dyn Fn(ImportProgress) + Send + Sync>;

/// Import progress information
#[derive(Debug, Clone)]
pub struct ImportProgress {
    /// Current phase of import
    pub phase: ImportPhase,
    /// Database being restored
    pub database: String,
    /// Sheet the progress refers to
    pub current_sheet: Option<String>,
    /// Total number of sheets in the artifact
    pub total_sheets: usize,
    /// Number of sheets handled so far
    pub sheets_completed: usize,
    /// Outcome of the sheet just handled
    pub outcome: Option<SheetOutcome>,
}

/// Phases of the import process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// Artifact opened, sheets about to be processed
    Starting,
    /// A sheet has been handled
    SheetProcessed,
    /// Import complete
    Complete,
}

/// Why a sheet was passed over without consulting the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than two rows: no header, or a header and no data
    TooFewRows,
}

/// What happened to one sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SheetOutcome {
    /// Documents were written. `replaced` counts the documents deleted first.
    /// A sheet whose rows all decode to nothing loads 0 and writes nothing.
    Loaded { documents: u64, replaced: u64 },
    /// Nothing to import
    Skipped { reason: SkipReason },
    /// The collection exists and the collision policy did not allow replacing it
    Declined,
    /// A row failed to decode; the collection was not touched
    Failed { error: String },
}

/// Outcome for one sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReport {
    /// Sheet name, which is also the target collection
    pub sheet: String,
    #[serde(flatten)]
    pub outcome: SheetOutcome,
}

/// Result of restoring one artifact
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Database the sheets were restored into
    pub database: String,
    /// Artifact read, when the import started from a file
    pub artifact: Option<PathBuf>,
    /// One entry per sheet, in workbook order
    pub sheets: Vec<SheetReport>,
}

impl ImportReport {
    /// Documents loaded across all sheets
    pub fn total_loaded(&self) -> u64 {
        self.sheets
            .iter()
            .map(|s| match s.outcome {
                SheetOutcome::Loaded { documents, .. } => documents,
                _ => 0,
            })
            .sum()
    }

    /// Documents loaded from the named sheet, if it was loaded
    pub fn loaded(&self, sheet: &str) -> Option<u64> {
        self.sheets.iter().find(|s| s.sheet == sheet).and_then(|s| match s.outcome {
            SheetOutcome::Loaded { documents, .. } => Some(documents),
            _ => None,
        })
    }

    /// Sheets that failed to decode
    pub fn failures(&self) -> impl Iterator<Item = &SheetReport> {
        self.sheets
            .iter()
            .filter(|s| matches!(s.outcome, SheetOutcome::Failed { .. }))
    }
}

/// Decode every data row of a sheet, dropping rows that decode to nothing.
///
/// The first row that fails to decode stops the sheet.
pub fn decode_sheet(sheet: &Sheet) -> Result<Vec<Document>, RowError> {
    let header = sheet.header();
    let mut documents = Vec::with_capacity(sheet.data_row_count());
    for (index, row) in sheet.data_rows().enumerate() {
        let decoded = decode_row(&header, row).map_err(|source| RowError {
            row: index + 2,
            source,
        })?;
        documents.extend(decoded);
    }
    Ok(documents)
}

/// Restores artifacts into a document store
pub struct Importer {
    store: Arc<dyn DocumentStore>,
    options: ImportOptions,
}

impl Importer {
    pub fn new(store: Arc<dyn DocumentStore>, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Database an artifact restores into under the current options
    pub fn target_database<'a>(&'a self, artifact: &'a Artifact) -> &'a str {
        self.options
            .target_database
            .as_deref()
            .unwrap_or(artifact.database())
    }

    /// Restore every sheet of an artifact
    pub async fn import_artifact(
        &self,
        artifact: &Artifact,
        policy: &dyn CollisionPolicy,
    ) -> Result<ImportReport, ImportError> {
        self.import_artifact_with_progress(artifact, policy, Box::new(|_| {}))
            .await
    }

    /// Import with progress callback
    #[tracing::instrument(skip_all, fields(artifact = %artifact.path().display()))]
    pub async fn import_artifact_with_progress(
        &self,
        artifact: &Artifact,
        policy: &dyn CollisionPolicy,
        progress: ImportProgressCallback,
    ) -> Result<ImportReport, ImportError> {
        let workbook = read_workbook(artifact.path())?;
        let database = self.target_database(artifact);

        let mut report = self
            .import_workbook(database, &workbook, policy, &progress)
            .await?;
        report.artifact = Some(artifact.path().to_path_buf());

        tracing::info!(
            database,
            sheets = report.sheets.len(),
            documents = report.total_loaded(),
            "artifact restored"
        );
        Ok(report)
    }

    /// Restore the sheets of an already parsed workbook into `database`
    pub async fn import_workbook(
        &self,
        database: &str,
        workbook: &Workbook,
        policy: &dyn CollisionPolicy,
        progress: &ImportProgressCallback,
    ) -> Result<ImportReport, ImportError> {
        let report_progress = |phase, sheet: Option<&Sheet>, completed, outcome| {
            progress(ImportProgress {
                phase,
                database: database.to_string(),
                current_sheet: sheet.map(|s| s.name().to_string()),
                total_sheets: workbook.len(),
                sheets_completed: completed,
                outcome,
            })
        };
        report_progress(ImportPhase::Starting, None, 0, None);

        let mut sheets = Vec::with_capacity(workbook.len());
        for (index, sheet) in workbook.sheets().iter().enumerate() {
            let outcome = self.import_sheet(database, sheet, policy).await?;
            report_progress(
                ImportPhase::SheetProcessed,
                Some(sheet),
                index + 1,
                Some(outcome.clone()),
            );
            sheets.push(SheetReport {
                sheet: sheet.name().to_string(),
                outcome,
            });
        }

        report_progress(ImportPhase::Complete, None, workbook.len(), None);
        Ok(ImportReport {
            database: database.to_string(),
            artifact: None,
            sheets,
        })
    }

    #[tracing::instrument(skip(self, sheet, policy), fields(collection = sheet.name()))]
    async fn import_sheet(
        &self,
        database: &str,
        sheet: &Sheet,
        policy: &dyn CollisionPolicy,
    ) -> Result<SheetOutcome, ImportError> {
        let collection = sheet.name();
        if sheet.physical_rows() < 2 {
            tracing::debug!("sheet has no data rows, skipping");
            return Ok(SheetOutcome::Skipped {
                reason: SkipReason::TooFewRows,
            });
        }

        if self.store.collection_exists(database, collection).await? {
            let decision = policy
                .decide(database, collection)
                .unwrap_or(CollisionDecision::Skip);
            if decision == CollisionDecision::Skip {
                tracing::info!("collection exists, leaving it untouched");
                return Ok(SheetOutcome::Declined);
            }
        }

        let documents = match decode_sheet(sheet) {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(error = %e, "sheet could not be decoded");
                return Ok(SheetOutcome::Failed {
                    error: e.to_string(),
                });
            }
        };

        if documents.is_empty() {
            tracing::debug!("no documents decoded, collection left untouched");
            return Ok(SheetOutcome::Loaded {
                documents: 0,
                replaced: 0,
            });
        }

        let replaced = self.store.delete_all(database, collection).await?;
        let documents = self
            .store
            .insert_many(database, collection, documents)
            .await?;
        tracing::info!(documents, replaced, "loaded documents into {}", collection);

        Ok(SheetOutcome::Loaded {
            documents,
            replaced,
        })
    }
}
