//! Restore command implementation.

use anyhow::{Context, Result, bail};
use docsheet_driver_mongodb::MongoDbConnection;
use docsheet_interchange::{
    Artifact, ArtifactError, ImportOptions, ImportPhase, ImportProgress, ImportReport, Importer,
    list_artifacts,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::OutputFormat;
use crate::commands::{closing, connect};
use crate::output::{emit, import_table, outcome_text};
use crate::prompt::Prompter;
use crate::settings::{CollisionMode, Settings};

/// Restore a backup workbook, asking which one when none is given
pub async fn run(
    settings: &Settings,
    artifact: Option<PathBuf>,
    on_collision: CollisionMode,
    database: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let artifact = match artifact {
        Some(path) => Artifact::from_path(resolve_artifact_path(&settings.backup_dir, path))?,
        None => {
            let artifacts = match list_artifacts(&settings.backup_dir) {
                Ok(artifacts) => artifacts,
                Err(ArtifactError::NoArtifactsFound(dir)) => {
                    println!("No backup files found in {}", dir.display());
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let names: Vec<String> = artifacts.iter().map(Artifact::file_name).collect();
            match Prompter::terminal().select("Which backup should be restored?", &names)? {
                Some(index) => artifacts[index].clone(),
                None => bail!("No backup selected"),
            }
        }
    };

    let options = match database {
        Some(database) => ImportOptions::default().with_target_database(database),
        None => ImportOptions::default(),
    };

    let store = connect(settings).await?;
    let report =
        closing(store, |store| restore(store, &artifact, options, on_collision)).await?;

    emit(format, &report, import_table)
}

async fn restore(
    store: Arc<MongoDbConnection>,
    artifact: &Artifact,
    options: ImportOptions,
    on_collision: CollisionMode,
) -> Result<ImportReport> {
    let importer = Importer::new(store, options);
    tracing::info!(
        artifact = %artifact.path().display(),
        database = importer.target_database(artifact),
        "restoring backup"
    );

    let policy = on_collision.policy();
    importer
        .import_artifact_with_progress(artifact, policy.as_ref(), Box::new(print_progress))
        .await
        .with_context(|| format!("Failed to restore {}", artifact.path().display()))
}

fn print_progress(p: ImportProgress) {
    if let (ImportPhase::SheetProcessed, Some(sheet), Some(outcome)) =
        (p.phase, &p.current_sheet, &p.outcome)
    {
        eprintln!(
            "[{}/{}] {}: {}",
            p.sheets_completed,
            p.total_sheets,
            sheet,
            outcome_text(outcome)
        );
    }
}

/// A bare file name that does not exist where it stands is looked up in the
/// backup directory
fn resolve_artifact_path(backup_dir: &Path, path: PathBuf) -> PathBuf {
    let bare = path.parent().is_none_or(|p| p.as_os_str().is_empty());
    if bare && !path.exists() {
        backup_dir.join(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_names_resolve_into_backup_dir() {
        let dir = tempfile::tempdir().unwrap();
        let resolved =
            resolve_artifact_path(dir.path(), PathBuf::from("shop-16-10-2026-14-05-09.xlsx"));
        assert_eq!(resolved, dir.path().join("shop-16-10-2026-14-05-09.xlsx"));
    }

    #[test]
    fn test_paths_with_directories_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = PathBuf::from("elsewhere/shop-1.xlsx");
        assert_eq!(resolve_artifact_path(dir.path(), path.clone()), path);
    }
}
