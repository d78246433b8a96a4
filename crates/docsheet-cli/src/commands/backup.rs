//! Backup command implementation.

use anyhow::{Result, bail};
use docsheet_core::DocumentStore;
use docsheet_driver_mongodb::MongoDbConnection;
use docsheet_interchange::{ExportOptions, ExportPhase, ExportProgress, ExportResult, Exporter};
use std::sync::Arc;

use crate::OutputFormat;
use crate::commands::{closing, connect};
use crate::output::{emit, export_table};
use crate::prompt::Prompter;
use crate::settings::Settings;

const ALL_DATABASES: &str = "*";

/// Which databases to back up
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    One(String),
    All,
}

/// Back up one database, or all of them, into the backup directory
pub async fn run(
    settings: &Settings,
    database: Option<String>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let store = connect(settings).await?;
    let results = closing(store, |store| export(settings, store, database, all)).await?;

    let Some(results) = results else {
        println!("No databases found");
        return Ok(());
    };
    emit(format, &results, |results| {
        results
            .iter()
            .map(export_table)
            .collect::<Vec<_>>()
            .join("\n\n")
    })
}

/// Export the selected databases, `None` when the server has none to offer
async fn export(
    settings: &Settings,
    store: Arc<MongoDbConnection>,
    database: Option<String>,
    all: bool,
) -> Result<Option<Vec<ExportResult>>> {
    let databases = store.list_databases().await?;

    let selection = match (database, all) {
        (_, true) => Selection::All,
        (Some(name), false) => Selection::One(name),
        (None, false) => {
            if databases.is_empty() {
                return Ok(None);
            }
            match choose_database(&mut Prompter::terminal(), &databases)? {
                Some(selection) => selection,
                None => bail!("No database selected"),
            }
        }
    };

    let exporter = Exporter::new(
        store,
        ExportOptions::default().with_backup_dir(&settings.backup_dir),
    );
    let results = match selection {
        Selection::All => {
            exporter
                .export_databases(&databases, Box::new(print_progress))
                .await?
        }
        Selection::One(name) => {
            vec![
                exporter
                    .export_database_with_progress(&name, Box::new(print_progress))
                    .await?,
            ]
        }
    };
    Ok(Some(results))
}

fn print_progress(p: ExportProgress) {
    match (p.phase, &p.current_collection) {
        (ExportPhase::Starting, _) => eprintln!(">>> Exporting data from {}...", p.database),
        (ExportPhase::CollectionExported, Some(collection)) => eprintln!(
            "[{}/{}] {}: {} documents",
            p.collections_completed, p.total_collections, collection, p.documents_exported
        ),
        _ => {}
    }
}

/// Offer the databases plus `*` for all of them
fn choose_database<R: std::io::BufRead, W: std::io::Write>(
    prompter: &mut Prompter<R, W>,
    databases: &[String],
) -> Result<Option<Selection>> {
    let mut options = databases.to_vec();
    options.push(ALL_DATABASES.to_string());

    let choice = prompter.select("Which database should be backed up?", &options)?;
    Ok(choice.map(|index| match databases.get(index) {
        Some(name) => Selection::One(name.clone()),
        None => Selection::All,
    }))
}
