//! Backup artifact naming and discovery
//!
//! Artifacts are named `<database>-<DD-MM-YYYY-HH-MM-SS>.xlsx` and live side
//! by side in one flat backup directory. The database an artifact restores
//! into is read back from its file name: everything before the first `-`.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension of backup artifacts
pub const ARTIFACT_EXTENSION: &str = "xlsx";

const NAME_SEPARATOR: char = '-';

/// Errors reading, writing or locating artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact {} is unreadable: {message}", .path.display())]
    ArtifactUnreadable { path: PathBuf, message: String },

    #[error("No backup artifacts found in {}", .0.display())]
    NoArtifactsFound(PathBuf),

    #[error("Failed to write artifact {}: {message}", .path.display())]
    ArtifactWrite { path: PathBuf, message: String },

    #[error("Artifact name {0:?} does not start with a database name")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A backup file together with the database it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    database: String,
}

impl Artifact {
    /// Describe the artifact at `path`, deriving its database from the name
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArtifactError::InvalidName(path.display().to_string()))?;
        let database = database_from_artifact_name(file_name)?;
        Ok(Self { path, database })
    }

    /// Location on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Database named by the artifact
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Bare file name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Replace the separators of a localized date-time with `-`.
///
/// `.`, `:` and spaces become `-`; commas are dropped, so
/// `16.10.2026, 14:05:09` becomes `16-10-2026-14-05-09`.
pub fn normalize_timestamp(localized: &str) -> String {
    localized
        .chars()
        .filter(|c| *c != ',')
        .map(|c| match c {
            '.' | ':' | ' ' => '-',
            other => other,
        })
        .collect()
}

/// Filesystem-safe timestamp for an artifact name
pub fn artifact_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    normalize_timestamp(&at.format("%d.%m.%Y, %H:%M:%S").to_string())
}

/// Artifact file name for a database exported at `at`
pub fn artifact_file_name<Tz>(database: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}{}{}.{}",
        database,
        NAME_SEPARATOR,
        artifact_timestamp(at),
        ARTIFACT_EXTENSION
    )
}

/// The database an artifact file name refers to.
///
/// A database name that itself contains `-` cannot be recovered this way.
pub fn database_from_artifact_name(file_name: &str) -> Result<String, ArtifactError> {
    let stem = file_name
        .strip_suffix(ARTIFACT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name);
    let database = stem.split(NAME_SEPARATOR).next().unwrap_or_default();

    if database.is_empty() {
        return Err(ArtifactError::InvalidName(file_name.to_string()));
    }
    Ok(database.to_string())
}

/// List the artifacts in a backup directory, sorted by file name
pub fn list_artifacts(dir: &Path) -> Result<Vec<Artifact>, ArtifactError> {
    if !dir.is_dir() {
        return Err(ArtifactError::NoArtifactsFound(dir.to_path_buf()));
    }

    let mut artifacts = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_artifact = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == ARTIFACT_EXTENSION);
        if !is_artifact {
            continue;
        }

        match Artifact::from_path(&path) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping artifact"),
        }
    }

    if artifacts.is_empty() {
        return Err(ArtifactError::NoArtifactsFound(dir.to_path_buf()));
    }

    artifacts.sort_by_key(Artifact::file_name);
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp("16.10.2026, 14:05:09"), "16-10-2026-14-05-09");
        assert_eq!(normalize_timestamp("1.2.2026 3:04"), "1-2-2026-3-04");
    }

    #[test]
    fn test_artifact_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 14, 5, 9).unwrap();
        assert_eq!(artifact_file_name("shop", &at), "shop-16-10-2026-14-05-09.xlsx");
    }

    #[test]
    fn test_artifact_timestamp_uses_the_given_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = Utc
            .with_ymd_and_hms(2026, 10, 16, 23, 30, 0)
            .unwrap()
            .with_timezone(&offset);
        assert_eq!(artifact_timestamp(&at), "17-10-2026-01-30-00");
    }

    #[test]
    fn test_database_from_artifact_name() {
        assert_eq!(
            database_from_artifact_name("shop-16-10-2026-14-05-09.xlsx").unwrap(),
            "shop"
        );
        assert_eq!(database_from_artifact_name("shop.xlsx").unwrap(), "shop");
        assert_eq!(
            database_from_artifact_name("my-app-16-10-2026-14-05-09.xlsx").unwrap(),
            "my"
        );
        assert!(matches!(
            database_from_artifact_name("-16-10-2026.xlsx"),
            Err(ArtifactError::InvalidName(_))
        ));
    }

    #[test]
    fn test_artifact_from_path() {
        let artifact = Artifact::from_path("/backups/shop-16-10-2026-14-05-09.xlsx").unwrap();
        assert_eq!(artifact.database(), "shop");
        assert_eq!(artifact.file_name(), "shop-16-10-2026-14-05-09.xlsx");
    }

    #[test]
    fn test_list_artifacts_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("backups");
        assert!(matches!(
            list_artifacts(&missing),
            Err(ArtifactError::NoArtifactsFound(p)) if p == missing
        ));
    }

    #[test]
    fn test_list_artifacts_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        assert!(matches!(
            list_artifacts(dir.path()),
            Err(ArtifactError::NoArtifactsFound(_))
        ));
    }

    #[test]
    fn test_list_artifacts_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "shop-16-10-2026-14-05-09.xlsx",
            "blog-01-01-2026-00-00-00.xlsx",
            "readme.md",
            "-broken.xlsx",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        let names: Vec<String> = list_artifacts(dir.path())
            .unwrap()
            .iter()
            .map(Artifact::file_name)
            .collect();
        assert_eq!(
            names,
            vec!["blog-01-01-2026-00-00-00.xlsx", "shop-16-10-2026-14-05-09.xlsx"]
        );
    }
}
