//! Listing commands.

use anyhow::Result;
use chrono::{DateTime, Local};
use docsheet_driver_mongodb::{MongoDbConnection, list_collections, list_databases};
use docsheet_interchange::{Artifact, ArtifactError, list_artifacts};
use std::sync::Arc;

use crate::OutputFormat;
use crate::commands::{closing, connect};
use crate::output::{BackupRow, DatabaseRow, backups_table, databases_table, emit};
use crate::settings::Settings;

/// List backup workbooks with their size and age
pub fn backups(settings: &Settings, format: OutputFormat) -> Result<()> {
    let artifacts = match list_artifacts(&settings.backup_dir) {
        Ok(artifacts) => artifacts,
        Err(ArtifactError::NoArtifactsFound(dir)) => {
            let message = format!("No backup files found in {}", dir.display());
            return emit(format, &Vec::<BackupRow>::new(), |_| message);
        }
        Err(e) => return Err(e.into()),
    };

    let rows: Vec<BackupRow> = artifacts.iter().map(backup_row).collect();
    emit(format, &rows, |rows| backups_table(rows))
}

fn backup_row(artifact: &Artifact) -> BackupRow {
    let metadata = std::fs::metadata(artifact.path()).ok();
    BackupRow {
        file: artifact.file_name(),
        database: artifact.database().to_string(),
        size_bytes: metadata.as_ref().map(|m| m.len()),
        modified: metadata
            .and_then(|m| m.modified().ok())
            .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

/// List user databases with their number of collections
pub async fn databases(settings: &Settings, format: OutputFormat) -> Result<()> {
    let store = connect(settings).await?;
    let rows = closing(store, database_rows).await?;
    emit(format, &rows, |rows| databases_table(rows))
}

async fn database_rows(store: Arc<MongoDbConnection>) -> Result<Vec<DatabaseRow>> {
    let mut rows = Vec::new();
    for info in list_databases(&store).await? {
        let collections = list_collections(&store, &info.name)
            .await?
            .iter()
            .filter(|c| c.is_exportable())
            .count();
        rows.push(DatabaseRow {
            name: info.name,
            collections,
            size_bytes: info.size_bytes,
        });
    }
    Ok(rows)
}
