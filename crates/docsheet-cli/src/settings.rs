//! Settings file
//!
//! Settings live in `<config_dir>/docsheet/config.toml`. Every key is
//! optional; missing keys take their defaults and a missing default file is
//! not an error.

use anyhow::{Context, Result};
use docsheet_driver_mongodb::DEFAULT_URI;
use docsheet_interchange::{CollisionDecision, CollisionPolicy, DEFAULT_BACKUP_DIR};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::prompt::InteractivePolicy;

const DEFAULT_LOG_FILTER: &str = "warn,docsheet=info,docsheet_interchange=info,docsheet_driver_mongodb=info";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("docsheet"))
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docsheet")
        .join("logs")
}

/// How restores treat collections that already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Ask for every existing collection
    #[default]
    Ask,
    /// Replace existing collections without asking
    Overwrite,
    /// Never touch existing collections
    Skip,
}

impl CollisionMode {
    pub fn policy(self) -> Box<dyn CollisionPolicy> {
        match self {
            CollisionMode::Ask => Box::new(InteractivePolicy),
            CollisionMode::Overwrite => Box::new(CollisionDecision::Overwrite),
            CollisionMode::Skip => Box::new(CollisionDecision::Skip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Connection string of the MongoDB server
    pub uri: String,
    /// Directory backups are written to and restored from
    pub backup_dir: PathBuf,
    pub on_collision: CollisionMode,
    /// Console log filter, used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Also write JSON log files
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            on_collision: CollisionMode::Ask,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::settings_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|p| p.join("config.toml"))
    }

    /// Apply values given on the command line or through the environment
    pub fn with_overrides(mut self, uri: Option<String>, backup_dir: Option<PathBuf>) -> Self {
        if let Some(uri) = uri {
            self.uri = uri;
        }
        if let Some(dir) = backup_dir {
            self.backup_dir = dir;
        }
        self
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.uri, "mongodb://localhost:27017/");
        assert_eq!(settings.backup_dir, PathBuf::from("backups"));
        assert_eq!(settings.on_collision, CollisionMode::Ask);
        assert!(!settings.json_logs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "uri = \"mongodb://db.internal:27017/\"\non_collision = \"overwrite\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.uri, "mongodb://db.internal:27017/");
        assert_eq!(settings.on_collision, CollisionMode::Overwrite);
        assert_eq!(settings.backup_dir, PathBuf::from("backups"));
    }

    #[test]
    fn test_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "backup_dir = \"/srv/backups\"\njson_logs = true\nlog_dir = \"/var/log/docsheet\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(
            settings,
            Settings {
                backup_dir: PathBuf::from("/srv/backups"),
                json_logs: true,
                log_dir: Some(PathBuf::from("/var/log/docsheet")),
                ..Settings::default()
            }
        );
        assert_eq!(settings.log_dir(), PathBuf::from("/var/log/docsheet"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_invalid_collision_mode_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "on_collision = \"merge\"\n").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_overrides(Some("mongodb://other/".to_string()), None);
        assert_eq!(settings.uri, "mongodb://other/");
        assert_eq!(settings.backup_dir, PathBuf::from("backups"));
    }
}
