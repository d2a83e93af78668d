//! Repository registry
//!
//! Lists, creates and deletes snapshot repositories on the cluster.

use std::fs;
use std::io::ErrorKind;

use regex::Regex;

use crate::client::SnapshotApi;
use crate::error::{BackupError, BackupResult};
use crate::models::{FsSettings, Repository};

/// Service for repository management
pub struct RepositoryRegistry<'a> {
    api: &'a SnapshotApi,
}

impl<'a> RepositoryRegistry<'a> {
    /// Create a new repository registry
    pub fn new(api: &'a SnapshotApi) -> Self {
        Self { api }
    }

    /// All repositories, optionally restricted to names matching `filter`.
    ///
    /// Repositories of types this tool does not model, and repositories whose
    /// settings cannot be read, are left out.
    pub fn list(&self, filter: Option<&Regex>) -> BackupResult<Vec<Repository>> {
        let mut repositories = Vec::new();

        for (name, info) in self.api.list_repositories()? {
            if filter.is_some_and(|re| !re.is_match(&name)) {
                continue;
            }
            match Repository::from_info(&name, &info) {
                Ok(Some(repo)) => repositories.push(repo),
                Ok(None) => tracing::debug!(
                    repository = %name,
                    repository_type = %info.repository_type,
                    "skipping repository of unknown type"
                ),
                Err(error) => tracing::warn!(
                    repository = %name,
                    %error,
                    "skipping repository with unreadable settings"
                ),
            }
        }

        Ok(repositories)
    }

    /// Get a repository by name
    pub fn get(&self, name: &str) -> BackupResult<Option<Repository>> {
        match self.api.get_repository(name)? {
            Some(info) => Repository::from_info(name, &info),
            None => Ok(None),
        }
    }

    /// Get a repository by name, failing if it does not exist
    pub fn require(&self, name: &str) -> BackupResult<Repository> {
        self.get(name)?
            .ok_or_else(|| BackupError::repository_not_found(name))
    }

    /// Create a filesystem repository unless one with this name already exists.
    ///
    /// When the name is taken, the repository as reported by the cluster is
    /// returned and `settings` are ignored. A name taken by a repository of
    /// a type this tool does not model is `Unsupported`. The flag is `true`
    /// when a create request was issued.
    pub fn ensure_filesystem(
        &self,
        name: &str,
        settings: FsSettings,
    ) -> BackupResult<(Repository, bool)> {
        if let Some(info) = self.api.get_repository(name)? {
            return match Repository::from_info(name, &info)? {
                Some(existing) => {
                    tracing::debug!(repository = %name, "repository already exists, reusing it");
                    Ok((existing, false))
                }
                None => Err(BackupError::Unsupported(info.repository_type)),
            };
        }

        let repository = Repository::filesystem(name, settings);
        self.api.put_repository(name, &repository.to_info()?)?;
        tracing::info!(repository = %name, "created repository");
        Ok((repository, true))
    }

    /// Unregister a repository and remove its files.
    ///
    /// Only filesystem repositories have files this tool can remove. A
    /// location that no longer exists is not an error. Relative locations are
    /// resolved by the cluster against its `path.repo`, so their files are
    /// left alone.
    pub fn delete(&self, repository: &Repository) -> BackupResult<()> {
        self.api.delete_repository(&repository.name)?;
        tracing::info!(repository = %repository.name, "deleted repository");

        if let Some(location) = repository.location() {
            if !location.is_absolute() {
                tracing::warn!(
                    location = %location.display(),
                    "relative repository location, not removing files"
                );
                return Ok(());
            }
            match fs::remove_dir_all(location) {
                Ok(()) => {
                    tracing::info!(location = %location.display(), "removed repository files");
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(
                        location = %location.display(),
                        "repository location already gone"
                    );
                }
                Err(e) => {
                    return Err(BackupError::Io(format!(
                        "Failed to remove repository location {}: {}",
                        location.display(),
                        e
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeSnapshotService;
    use crate::client::Method;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_list_with_filter() {
        let service = FakeSnapshotService::new();
        service.add_fs_repository("backup_20240101", "/tmp/a");
        service.add_fs_repository("other_20240101", "/tmp/b");
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let re = Regex::new(r"^backup_\d{8}$").unwrap();
        let names: Vec<String> = registry
            .list(Some(&re))
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["backup_20240101"]);

        assert_eq!(registry.list(None).unwrap().len(), 2);
    }

    #[test]
    fn test_list_skips_unknown_types() {
        let service = FakeSnapshotService::new();
        service.add_fs_repository("nightly", "/tmp/a");
        service.add_repository("readonly", json!({"type": "url", "settings": {}}));
        let api = service.api();

        let repos = RepositoryRegistry::new(&api).list(None).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "nightly");
    }

    #[test]
    fn test_ensure_creates_then_reuses() {
        let service = FakeSnapshotService::new();
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let (repo, created) = registry
            .ensure_filesystem("nightly", FsSettings::new("/srv/es/nightly"))
            .unwrap();
        assert!(created);
        assert_eq!(repo.location().unwrap().to_str(), Some("/srv/es/nightly"));

        let (again, created) = registry
            .ensure_filesystem("nightly", FsSettings::new("/somewhere/else"))
            .unwrap();
        assert!(!created);
        assert_eq!(again.location().unwrap().to_str(), Some("/srv/es/nightly"));

        let puts = service
            .mutating_requests()
            .into_iter()
            .filter(|(m, _)| *m == Method::Put)
            .count();
        assert_eq!(puts, 1);
    }

    #[test]
    fn test_require_missing() {
        let service = FakeSnapshotService::new();
        let api = service.api();
        let err = RepositoryRegistry::new(&api).require("ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_removes_location() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("20240101");
        fs::create_dir_all(location.join("indices")).unwrap();
        fs::write(location.join("index"), b"meta").unwrap();

        let service = FakeSnapshotService::new();
        service.add_fs_repository("backup_20240101", location.to_str().unwrap());
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let repo = registry.require("backup_20240101").unwrap();
        registry.delete(&repo).unwrap();

        assert!(!location.exists());
        assert!(service.repository_names().is_empty());
    }

    #[test]
    fn test_delete_tolerates_missing_location() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("never-created");

        let service = FakeSnapshotService::new();
        service.add_fs_repository("backup_20240101", location.to_str().unwrap());
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let repo = registry.require("backup_20240101").unwrap();
        registry.delete(&repo).unwrap();
    }

    #[test]
    fn test_rejected_delete_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("20240101");
        fs::create_dir_all(&location).unwrap();

        let service = FakeSnapshotService::new();
        service.add_fs_repository("backup_20240101", location.to_str().unwrap());
        service.fail(Method::Delete, "backup_20240101", 500);
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let repo = registry.require("backup_20240101").unwrap();
        assert!(registry.delete(&repo).is_err());
        assert!(location.exists());
    }

    #[test]
    fn test_list_skips_unreadable_settings() {
        let service = FakeSnapshotService::new();
        service.add_repository("backup_20240101", json!({"type": "fs", "settings": {}}));
        service.add_fs_repository("backup_20240102", "/tmp/b");
        let api = service.api();

        let repos = RepositoryRegistry::new(&api).list(None).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "backup_20240102");
    }

    #[test]
    fn test_ensure_does_not_replace_unknown_type() {
        let service = FakeSnapshotService::new();
        service.add_repository(
            "backup_20240110",
            json!({"type": "url", "settings": {"url": "http://mirror/"}}),
        );
        let api = service.api();

        let err = RepositoryRegistry::new(&api)
            .ensure_filesystem("backup_20240110", FsSettings::new("/srv/es/20240110"))
            .unwrap_err();

        assert!(matches!(err, BackupError::Unsupported(ref t) if t == "url"));
        assert!(service.mutating_requests().is_empty());
        assert_eq!(service.repository("backup_20240110").unwrap()["type"], "url");
    }

    #[test]
    fn test_delete_keeps_relative_location() {
        let local = tempfile::Builder::new()
            .prefix("es-backup-relative")
            .tempdir_in(".")
            .unwrap();
        let relative = local.path().strip_prefix(".").unwrap_or(local.path());
        assert!(relative.is_relative());

        let service = FakeSnapshotService::new();
        service.add_fs_repository("backup_20240101", relative.to_str().unwrap());
        let api = service.api();
        let registry = RepositoryRegistry::new(&api);

        let repo = registry.require("backup_20240101").unwrap();
        registry.delete(&repo).unwrap();

        assert!(local.path().exists());
        assert!(service.repository_names().is_empty());
    }
}
