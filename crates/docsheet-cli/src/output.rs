//! Output formatting utilities.

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use docsheet_interchange::{ExportResult, ImportReport, SheetOutcome, SkipReason};
use serde::Serialize;

use crate::OutputFormat;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().copied());
    table
}

fn count(n: u64) -> Cell {
    Cell::new(n).set_alignment(CellAlignment::Right)
}

/// Print `value` as JSON, or the table built by `render`
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

pub fn export_table(result: &ExportResult) -> String {
    let mut t = table(&["Collection", "Documents"]);
    for collection in &result.collections {
        t.add_row(vec![Cell::new(&collection.name), count(collection.documents)]);
    }
    format!(
        "{}\n{} documents from {} written to {}",
        t,
        result.total_documents(),
        result.database,
        result.artifact.display()
    )
}

pub fn outcome_text(outcome: &SheetOutcome) -> String {
    match outcome {
        SheetOutcome::Loaded { documents, replaced: 0 } => format!("loaded {}", documents),
        SheetOutcome::Loaded {
            documents,
            replaced,
        } => format!("loaded {} (replaced {})", documents, replaced),
        SheetOutcome::Skipped {
            reason: SkipReason::TooFewRows,
        } => "skipped: no data rows".to_string(),
        SheetOutcome::Declined => "kept existing collection".to_string(),
        SheetOutcome::Failed { error } => format!("failed: {}", error),
    }
}

pub fn import_table(report: &ImportReport) -> String {
    let mut t = table(&["Collection", "Result"]);
    for sheet in &report.sheets {
        t.add_row(vec![Cell::new(&sheet.sheet), Cell::new(outcome_text(&sheet.outcome))]);
    }
    format!(
        "{}\n{} documents restored into {}",
        t,
        report.total_loaded(),
        report.database
    )
}

#[derive(Debug, Serialize)]
pub struct BackupRow {
    pub file: String,
    pub database: String,
    pub size_bytes: Option<u64>,
    pub modified: Option<String>,
}

pub fn backups_table(rows: &[BackupRow]) -> String {
    let mut t = table(&["File", "Database", "Size", "Modified"]);
    for row in rows {
        t.add_row(vec![
            Cell::new(&row.file),
            Cell::new(&row.database),
            row.size_bytes.map(count).unwrap_or_else(|| Cell::new("-")),
            Cell::new(row.modified.as_deref().unwrap_or("-")),
        ]);
    }
    t.to_string()
}

#[derive(Debug, Serialize)]
pub struct DatabaseRow {
    pub name: String,
    pub collections: usize,
    pub size_bytes: Option<u64>,
}

pub fn databases_table(rows: &[DatabaseRow]) -> String {
    let mut t = table(&["Database", "Collections", "Size"]);
    for row in rows {
        t.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.collections).set_alignment(CellAlignment::Right),
            row.size_bytes.map(count).unwrap_or_else(|| Cell::new("-")),
        ]);
    }
    t.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsheet_interchange::{CollectionSummary, SheetReport};
    use std::path::PathBuf;

    #[test]
    fn test_outcome_text() {
        assert_eq!(
            outcome_text(&SheetOutcome::Loaded {
                documents: 3,
                replaced: 0
            }),
            "loaded 3"
        );
        assert_eq!(
            outcome_text(&SheetOutcome::Loaded {
                documents: 3,
                replaced: 5
            }),
            "loaded 3 (replaced 5)"
        );
        assert_eq!(outcome_text(&SheetOutcome::Declined), "kept existing collection");
    }

    #[test]
    fn test_tables_mention_every_entry() {
        let export = ExportResult {
            database: "shop".to_string(),
            artifact: PathBuf::from("backups/shop-16-10-2026-14-05-09.xlsx"),
            collections: vec![CollectionSummary {
                name: "users".to_string(),
                documents: 2,
            }],
        };
        let rendered = export_table(&export);
        assert!(rendered.contains("users"));
        assert!(rendered.contains("2 documents from shop"));

        let import = ImportReport {
            database: "shop".to_string(),
            artifact: None,
            sheets: vec![SheetReport {
                sheet: "orders".to_string(),
                outcome: SheetOutcome::Failed {
                    error: "row 3: bad id".to_string(),
                },
            }],
        };
        let rendered = import_table(&import);
        assert!(rendered.contains("orders"));
        assert!(rendered.ends_with("0 documents restored into shop"));
    }
}
