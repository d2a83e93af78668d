//! Repository model
//!
//! Represents snapshot repositories registered with the search cluster.
//! Only filesystem repositories have a settings contract; the other types
//! are recognised so listings can show them, but cannot be created.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::RepositoryInfo;
use crate::config::settings::FsDefaults;
use crate::error::{BackupError, BackupResult};

/// Type of snapshot repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Shared filesystem
    #[default]
    Fs,
    /// Amazon S3 bucket
    S3,
    /// Azure blob storage
    Azure,
    /// Hadoop filesystem
    Hdfs,
}

impl RepositoryType {
    /// Parse repository type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fs" | "filesystem" => Some(Self::Fs),
            "s3" => Some(Self::S3),
            "azure" => Some(Self::Azure),
            "hdfs" => Some(Self::Hdfs),
            _ => None,
        }
    }

    /// Name used by the snapshot API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fs => "fs",
            Self::S3 => "s3",
            Self::Azure => "azure",
            Self::Hdfs => "hdfs",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of a filesystem repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsSettings {
    /// Directory holding the repository, as seen by the cluster nodes
    pub location: PathBuf,
    /// Compress metadata files
    pub compress: bool,
    /// Break large files into chunks of this size
    pub chunk_size: Option<String>,
    /// Max restore throughput per node, e.g. `20mb`
    pub restore_rate: String,
    /// Max snapshot throughput per node, e.g. `20mb`
    pub snapshot_rate: String,
}

impl FsSettings {
    /// Settings at `location` with the built-in defaults
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self::from_defaults(location, &FsDefaults::default())
    }

    /// Settings at `location` with configured defaults
    pub fn from_defaults(location: impl Into<PathBuf>, defaults: &FsDefaults) -> Self {
        Self {
            location: location.into(),
            compress: defaults.compress,
            chunk_size: defaults.chunk_size.clone(),
            restore_rate: defaults.restore_rate.clone(),
            snapshot_rate: defaults.snapshot_rate.clone(),
        }
    }

    fn from_settings(name: &str, settings: &Map<String, Value>) -> BackupResult<Self> {
        let location = setting_string(settings, "location").ok_or_else(|| {
            BackupError::MalformedResponse {
                resource: format!("repository {}", name),
                message: "filesystem repository has no location".into(),
            }
        })?;

        Ok(Self {
            location: PathBuf::from(location),
            compress: setting_bool(name, settings, "compress")?.unwrap_or(true),
            chunk_size: setting_string(settings, "chunk_size"),
            restore_rate: setting_string(settings, "max_restore_bytes_per_sec")
                .unwrap_or_else(|| "20mb".into()),
            snapshot_rate: setting_string(settings, "max_snapshot_bytes_per_sec")
                .unwrap_or_else(|| "20mb".into()),
        })
    }

    fn to_settings(&self) -> Map<String, Value> {
        let mut settings = Map::new();
        settings.insert(
            "location".into(),
            Value::String(self.location.to_string_lossy().into_owned()),
        );
        settings.insert("compress".into(), Value::Bool(self.compress));
        settings.insert(
            "chunk_size".into(),
            self.chunk_size.clone().map_or(Value::Null, Value::String),
        );
        settings.insert(
            "max_restore_bytes_per_sec".into(),
            Value::String(self.restore_rate.clone()),
        );
        settings.insert(
            "max_snapshot_bytes_per_sec".into(),
            Value::String(self.snapshot_rate.clone()),
        );
        settings
    }
}

/// Type specific settings of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySettings {
    Filesystem(FsSettings),
    S3,
    Azure,
    Hdfs,
}

/// A snapshot repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Unique name within the cluster
    pub name: String,
    pub settings: RepositorySettings,
}

impl Repository {
    /// Create a filesystem repository handle
    pub fn filesystem(name: impl Into<String>, settings: FsSettings) -> Self {
        Self {
            name: name.into(),
            settings: RepositorySettings::Filesystem(settings),
        }
    }

    pub fn repository_type(&self) -> RepositoryType {
        match self.settings {
            RepositorySettings::Filesystem(_) => RepositoryType::Fs,
            RepositorySettings::S3 => RepositoryType::S3,
            RepositorySettings::Azure => RepositoryType::Azure,
            RepositorySettings::Hdfs => RepositoryType::Hdfs,
        }
    }

    /// Storage location, for filesystem repositories
    pub fn location(&self) -> Option<&Path> {
        match &self.settings {
            RepositorySettings::Filesystem(fs) => Some(fs.location.as_path()),
            _ => None,
        }
    }

    /// Build a repository from the metadata the service reported.
    ///
    /// Returns `None` for repository types this tool does not know about
    /// (e.g. `url` or `source` repositories).
    pub fn from_info(name: &str, info: &RepositoryInfo) -> BackupResult<Option<Self>> {
        let settings = match RepositoryType::parse(&info.repository_type) {
            Some(RepositoryType::Fs) => {
                RepositorySettings::Filesystem(FsSettings::from_settings(name, &info.settings)?)
            }
            Some(RepositoryType::S3) => RepositorySettings::S3,
            Some(RepositoryType::Azure) => RepositorySettings::Azure,
            Some(RepositoryType::Hdfs) => RepositorySettings::Hdfs,
            None => return Ok(None),
        };

        Ok(Some(Self {
            name: name.to_string(),
            settings,
        }))
    }

    /// Request body used to register this repository
    pub fn to_info(&self) -> BackupResult<RepositoryInfo> {
        match &self.settings {
            RepositorySettings::Filesystem(fs) => Ok(RepositoryInfo {
                repository_type: RepositoryType::Fs.as_str().to_string(),
                settings: fs.to_settings(),
            }),
            _ => Err(BackupError::Unsupported(self.repository_type().to_string())),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "repo {} - location: {}", self.name, location.display()),
            None => write!(f, "repo {} ({})", self.name, self.repository_type()),
        }
    }
}

/// Read a setting as a string; the service reports numbers and booleans as strings too
fn setting_string(settings: &Map<String, Value>, key: &str) -> Option<String> {
    match settings.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn setting_bool(name: &str, settings: &Map<String, Value>, key: &str) -> BackupResult<Option<bool>> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(other) => Err(BackupError::MalformedResponse {
            resource: format!("repository {}", name),
            message: format!("setting '{}' is not a boolean: {}", key, other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(value: Value) -> RepositoryInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_repository_type_parse() {
        assert_eq!(RepositoryType::parse("fs"), Some(RepositoryType::Fs));
        assert_eq!(RepositoryType::parse("HDFS"), Some(RepositoryType::Hdfs));
        assert_eq!(RepositoryType::parse("url"), None);
        assert_eq!(RepositoryType::Azure.to_string(), "azure");
    }

    #[test]
    fn test_from_info_reads_string_settings() {
        let info = info(json!({
            "type": "fs",
            "settings": {
                "location": "/var/backups/es/20240101",
                "compress": "false",
                "chunk_size": "1g",
                "max_restore_bytes_per_sec": "40mb"
            }
        }));

        let repo = Repository::from_info("backup_20240101", &info).unwrap().unwrap();
        let RepositorySettings::Filesystem(fs) = &repo.settings else {
            panic!("expected filesystem repository");
        };
        assert_eq!(fs.location, PathBuf::from("/var/backups/es/20240101"));
        assert!(!fs.compress);
        assert_eq!(fs.chunk_size.as_deref(), Some("1g"));
        assert_eq!(fs.restore_rate, "40mb");
        assert_eq!(fs.snapshot_rate, "20mb");
    }

    #[test]
    fn test_from_info_unknown_type_is_skipped() {
        let info = info(json!({"type": "url", "settings": {"url": "http://x"}}));
        assert!(Repository::from_info("readonly", &info).unwrap().is_none());
    }

    #[test]
    fn test_from_info_fs_without_location() {
        let info = info(json!({"type": "fs", "settings": {}}));
        let err = Repository::from_info("broken", &info).unwrap_err();
        assert!(matches!(err, BackupError::MalformedResponse { .. }));
    }

    #[test]
    fn test_to_info_body() {
        let repo = Repository::filesystem("nightly", FsSettings::new("/srv/es/nightly"));
        let body = serde_json::to_value(repo.to_info().unwrap()).unwrap();

        assert_eq!(
            body,
            json!({
                "type": "fs",
                "settings": {
                    "location": "/srv/es/nightly",
                    "compress": true,
                    "chunk_size": null,
                    "max_restore_bytes_per_sec": "20mb",
                    "max_snapshot_bytes_per_sec": "20mb"
                }
            })
        );
    }

    #[test]
    fn test_non_filesystem_cannot_be_created() {
        let repo = Repository {
            name: "cloud".into(),
            settings: RepositorySettings::S3,
        };
        assert!(matches!(repo.to_info(), Err(BackupError::Unsupported(_))));
        assert!(repo.location().is_none());
    }
}
