//! docsheet command line interface
//!
//! Backs up MongoDB databases to XLSX workbooks, one worksheet per
//! collection, and restores them again.

mod commands;
mod logging;
mod output;
mod prompt;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LoggingConfig;
use crate::settings::{CollisionMode, Settings};

/// Back up MongoDB databases to spreadsheets and restore them
#[derive(Parser, Debug)]
#[command(name = "docsheet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file to use instead of the default one
    #[arg(short, long, env = "DOCSHEET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(long, env = "DOCSHEET_URI", global = true)]
    pub uri: Option<String>,

    /// Directory backups are written to and restored from
    #[arg(long, env = "DOCSHEET_BACKUP_DIR", global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Log debug output from every component
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable tables
    Table,
    /// JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up a database, or every database, to a new workbook
    Backup {
        /// Database to back up; asked for when omitted
        #[arg(short, long, conflicts_with = "all")]
        database: Option<String>,

        /// Back up every user database, one workbook each
        #[arg(long)]
        all: bool,
    },

    /// Restore a backup workbook into its database
    Restore {
        /// Workbook to restore; chosen from the backup directory when omitted
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// What to do with collections that already exist
        #[arg(long, value_enum, env = "DOCSHEET_ON_COLLISION")]
        on_collision: Option<CollisionMode>,

        /// Restore into this database instead of the one in the file name
        #[arg(short, long)]
        database: Option<String>,
    },

    /// List the workbooks in the backup directory
    ListBackups,

    /// List the user databases on the server
    ListDatabases,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(cli.uri, cli.backup_dir);

    let mut log_config = LoggingConfig::from_settings(&settings);
    if cli.verbose {
        log_config = log_config.verbose();
    }
    let _log_guard = logging::init(&log_config)?;

    match cli.command {
        Commands::Backup { database, all } => {
            commands::backup::run(&settings, database, all, cli.format).await
        }
        Commands::Restore {
            artifact,
            on_collision,
            database,
        } => {
            let mode = on_collision.unwrap_or(settings.on_collision);
            commands::restore::run(&settings, artifact, mode, database, cli.format).await
        }
        Commands::ListBackups => commands::list::backups(&settings, cli.format),
        Commands::ListDatabases => commands::list::databases(&settings, cli.format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_backup_arguments() {
        let cli = Cli::try_parse_from(["docsheet", "backup", "--database", "shop"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backup { database: Some(ref d), all: false } if d == "shop"
        ));

        assert!(Cli::try_parse_from(["docsheet", "backup", "--all", "--database", "shop"]).is_err());
    }

    #[test]
    fn test_restore_arguments() {
        let cli = Cli::try_parse_from([
            "docsheet",
            "restore",
            "--artifact",
            "shop-16-10-2026-14-05-09.xlsx",
            "--on-collision",
            "overwrite",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Restore {
                artifact,
                on_collision,
                database,
            } => {
                assert_eq!(artifact, Some(PathBuf::from("shop-16-10-2026-14-05-09.xlsx")));
                assert_eq!(on_collision, Some(CollisionMode::Overwrite));
                assert_eq!(database, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
