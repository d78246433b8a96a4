//! Docsheet spreadsheet interchange
//!
//! Moves whole collections between a document store and a spreadsheet
//! workbook: one worksheet per collection, the first row holding field
//! names and every following row holding one document.
//!
//! # Architecture
//!
//! ```text
//! DocumentStore → Exporter → Workbook → .xlsx artifact
//!                    ↓                        ↓
//!              Value Codec              Importer → DocumentStore
//!              (value→cell)             (cell→value)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let exporter = Exporter::new(store.clone(), ExportOptions::default());
//! let result = exporter.export_database("shop").await?;
//!
//! let artifact = Artifact::from_path(&result.artifact)?;
//! let importer = Importer::new(store, ImportOptions::default());
//! let report = importer.import_artifact(&artifact, &CollisionDecision::Skip).await?;
//! ```

mod artifact;
mod exporter;
mod importer;
#[cfg(test)]
mod round_trip_tests;
mod value_encoding;
mod workbook;
mod xlsx;

pub use artifact::{
    ARTIFACT_EXTENSION, Artifact, ArtifactError, artifact_file_name, artifact_timestamp,
    database_from_artifact_name, list_artifacts, normalize_timestamp,
};
pub use exporter::{
    CollectionSummary, DEFAULT_BACKUP_DIR, ExportError, ExportOptions, ExportPhase, ExportProgress,
    ExportProgressCallback, ExportResult, Exporter,
};
pub use importer::{
    CollisionDecision, CollisionPolicy, ImportError, ImportOptions, ImportPhase, ImportProgress,
    ImportProgressCallback, ImportReport, Importer, RowError, SheetOutcome, SheetReport,
    SkipReason, decode_sheet,
};
pub use value_encoding::*;
pub use workbook::{Sheet, Workbook};
pub use xlsx::{read_workbook, write_workbook};
