//! Settings for es-backup
//!
//! Settings are read once at startup from a JSON file with three sections:
//! `default` (API endpoint and snapshot flags), `fs` (filesystem repository
//! defaults) and `backup` (scheduled backup retention). Every value except
//! `default.base_url` has a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ConfigPaths;
use crate::error::BackupError;
use crate::models::RepositoryType;

/// Connection settings and default snapshot flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSettings {
    /// Root of the search cluster HTTP API, e.g. `http://localhost:9200`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout for every HTTP request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub ignore_unavailable: bool,

    #[serde(default = "default_true")]
    pub include_global_state: bool,

    #[serde(default)]
    pub partial: bool,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            ignore_unavailable: false,
            include_global_state: true,
            partial: false,
        }
    }
}

/// Defaults for filesystem repositories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FsDefaults {
    /// Compress metadata files
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Break large files into chunks of this size (e.g. `1g`); none by default
    #[serde(default)]
    pub chunk_size: Option<String>,

    #[serde(default = "default_rate")]
    pub restore_rate: String,

    #[serde(default = "default_rate")]
    pub snapshot_rate: String,

    /// Directory under which dated backup repositories are created
    #[serde(default = "default_backup_base_path")]
    pub backup_base_path: PathBuf,
}

impl Default for FsDefaults {
    fn default() -> Self {
        Self {
            compress: true,
            chunk_size: None,
            restore_rate: default_rate(),
            snapshot_rate: default_rate(),
            backup_base_path: default_backup_base_path(),
        }
    }
}

/// Scheduled backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupDefaults {
    #[serde(default)]
    pub backup_type: RepositoryType,

    /// Number of full backups (dated repositories) to keep
    #[serde(default = "default_full_backup_count")]
    pub full_backup_count: u32,

    /// Days a full backup is written to before rolling over to a new one
    #[serde(default = "default_full_backup_life")]
    pub full_backup_life: u32,

    /// Name prefix of dated backup repositories
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Multi-index expression to snapshot
    #[serde(default = "default_indices")]
    pub indices: String,
}

impl Default for BackupDefaults {
    fn default() -> Self {
        Self {
            backup_type: RepositoryType::default(),
            full_backup_count: default_full_backup_count(),
            full_backup_life: default_full_backup_life(),
            prefix: default_prefix(),
            indices: default_indices(),
        }
    }
}

/// Settings for es-backup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub default: DefaultSettings,

    #[serde(default)]
    pub fs: FsDefaults,

    #[serde(default)]
    pub backup: BackupDefaults,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rate() -> String {
    "20mb".to_string()
}

fn default_backup_base_path() -> PathBuf {
    PathBuf::from("/var/backups/elasticsearch")
}

fn default_full_backup_count() -> u32 {
    4
}

fn default_full_backup_life() -> u32 {
    7
}

fn default_prefix() -> String {
    "backup".to_string()
}

fn default_indices() -> String {
    "_all".to_string()
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_default(paths: &ConfigPaths) -> Result<Self, BackupError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            tracing::debug!(path = %settings_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(settings_path).map_err(|e| {
            BackupError::Io(format!(
                "Failed to read settings file {}: {}",
                settings_path.display(),
                e
            ))
        })?;

        Self::from_json(&contents)
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json(contents: &str) -> Result<Self, BackupError> {
        let settings: Settings = serde_json::from_str(contents)
            .map_err(|e| BackupError::Config(format!("Failed to parse settings file: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the retention engine meaningless
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.backup.full_backup_count == 0 {
            return Err(BackupError::Validation(
                "backup.full_backup_count must be at least 1".into(),
            ));
        }
        if self.backup.full_backup_life == 0 {
            return Err(BackupError::Validation(
                "backup.full_backup_life must be at least 1".into(),
            ));
        }
        if self.backup.prefix.trim().is_empty() {
            return Err(BackupError::Validation(
                "backup.prefix cannot be empty".into(),
            ));
        }
        if self.default.timeout_secs == 0 {
            return Err(BackupError::Validation(
                "default.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply a base URL given on the command line or in the environment
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.default.base_url = base_url;
        }
        self
    }

    /// The snapshot API root, which has no default
    pub fn base_url(&self) -> Result<&str, BackupError> {
        self.default
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| BackupError::ConfigMissing("default.base_url".into()))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ConfigPaths) -> Result<(), BackupError> {
        paths.ensure_parent()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            BackupError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            BackupError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
