//! Config file location for es-backup
//!
//! ## Path Resolution Order
//!
//! 1. `ES_BACKUP_CONFIG` environment variable (if set)
//! 2. `/etc/es-backup/config.json` (if it exists)
//! 3. The per-user config directory, e.g. `~/.config/es-backup/config.json`

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::BackupError;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "ES_BACKUP_CONFIG";

const SYSTEM_CONFIG: &str = "/etc/es-backup/config.json";

/// Location of the settings file
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    settings_file: PathBuf,
}

impl ConfigPaths {
    /// Resolve the settings file location
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory can be determined.
    pub fn new() -> Result<Self, BackupError> {
        if let Ok(custom) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(Self::with_file(PathBuf::from(custom)));
        }

        let system = PathBuf::from(SYSTEM_CONFIG);
        if system.exists() {
            return Ok(Self::with_file(system));
        }

        let dirs = ProjectDirs::from("", "", "es-backup").ok_or_else(|| {
            BackupError::Config("Could not determine a configuration directory".into())
        })?;
        Ok(Self::with_file(dirs.config_dir().join("config.json")))
    }

    /// Use an explicit settings file (useful for testing)
    pub fn with_file(settings_file: PathBuf) -> Self {
        Self { settings_file }
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Create the directory holding the settings file
    pub fn ensure_parent(&self) -> Result<(), BackupError> {
        if let Some(parent) = self.settings_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackupError::Io(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
