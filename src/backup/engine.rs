//! Backup retention engine
//!
//! Decides which dated repository the next snapshot goes into, takes the
//! snapshot, and ages out repositories older than the retention policy allows.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::naming::{self, Clock};
use super::policy::RetentionPolicy;
use crate::client::SnapshotApi;
use crate::config::settings::FsDefaults;
use crate::error::{BackupError, BackupResult};
use crate::models::{FsSettings, Repository, RepositoryType, Snapshot, SnapshotOptions};
use crate::services::{RepositoryRegistry, SnapshotManager};

/// A backup repository together with the date encoded in its name
#[derive(Debug, Clone)]
pub struct DatedRepository {
    pub repository: Repository,
    pub date: NaiveDate,
}

/// The repository chosen for the next snapshot
#[derive(Debug, Clone)]
pub struct TargetSelection {
    pub repository: Repository,
    /// A create request was issued for the repository
    pub created: bool,
    /// Age of the most recent existing backup, `None` if there was none
    pub previous_age_days: Option<i64>,
}

/// A repository that qualified for deletion but could not be deleted
#[derive(Debug)]
pub struct PruneFailure {
    pub repository: String,
    pub error: BackupError,
}

/// Outcome of aging out old repositories
#[derive(Debug, Default)]
pub struct PruneReport {
    /// Names of deleted repositories
    pub deleted: Vec<String>,
    /// Names of repositories still within the retention window
    pub retained: Vec<String>,
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    /// Number of repositories that qualified for deletion
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failures.len()
    }

    /// Every qualifying repository was deleted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything a scheduled backup run needs
#[derive(Debug, Clone)]
pub struct ScheduledBackup {
    pub repository_type: RepositoryType,
    pub policy: RetentionPolicy,
    /// Directory under which dated repositories are created
    pub base_path: PathBuf,
    pub prefix: String,
    pub options: SnapshotOptions,
}

/// Result of a scheduled backup run
#[derive(Debug)]
pub struct ScheduledBackupOutcome {
    pub target: TargetSelection,
    /// A rejected snapshot request does not stop pruning
    pub snapshot: BackupResult<Snapshot>,
    pub prune: PruneReport,
}

/// Rolls dated backup repositories over and ages them out
pub struct BackupEngine<'a> {
    registry: RepositoryRegistry<'a>,
    snapshots: SnapshotManager<'a>,
    clock: &'a dyn Clock,
    fs_defaults: FsDefaults,
}

impl<'a> BackupEngine<'a> {
    /// Create an engine with the built-in filesystem repository defaults
    pub fn new(api: &'a SnapshotApi, clock: &'a dyn Clock) -> Self {
        Self {
            registry: RepositoryRegistry::new(api),
            snapshots: SnapshotManager::new(api),
            clock,
            fs_defaults: FsDefaults::default(),
        }
    }

    /// Use configured settings for newly created repositories
    pub fn with_fs_defaults(mut self, fs_defaults: FsDefaults) -> Self {
        self.fs_defaults = fs_defaults;
        self
    }

    /// Repositories named `<prefix>_<YYYYMMDD>`, most recent first.
    ///
    /// Names whose suffix is not a calendar date are skipped.
    pub fn dated_repositories(&self, prefix: &str) -> BackupResult<Vec<DatedRepository>> {
        let pattern = naming::backup_pattern(prefix)?;
        let mut dated: Vec<DatedRepository> = self
            .registry
            .list(Some(&pattern))?
            .into_iter()
            .filter_map(|repository| match naming::repository_date(&repository.name) {
                Some(date) => Some(DatedRepository { repository, date }),
                None => {
                    tracing::warn!(
                        repository = %repository.name,
                        "ignoring backup repository without a valid date suffix"
                    );
                    None
                }
            })
            .collect();

        dated.sort_by(|a, b| b.repository.name.cmp(&a.repository.name));
        Ok(dated)
    }

    /// Pick the repository the next snapshot is written into.
    ///
    /// The most recent `<prefix>_<date>` repository is reused while it is at
    /// most `life` days old. Otherwise `<prefix>_<today>` is created at
    /// `<base_path>/<today>`, or reused if it already exists.
    pub fn select_target_repository(
        &self,
        prefix: &str,
        life: u32,
        base_path: &Path,
    ) -> BackupResult<TargetSelection> {
        let today = self.clock.today();
        let mut existing = self.dated_repositories(prefix)?;

        let previous_age_days = existing
            .first()
            .map(|latest| naming::age_in_days(today, latest.date));

        match previous_age_days {
            Some(age) if age <= i64::from(life) => {
                let latest = existing.swap_remove(0);
                tracing::debug!(
                    repository = %latest.repository.name,
                    age_days = age,
                    "reusing current backup repository"
                );
                Ok(TargetSelection {
                    repository: latest.repository,
                    created: false,
                    previous_age_days,
                })
            }
            _ => {
                let name = naming::repository_name(prefix, today);
                let location = base_path.join(naming::repository_dir_name(today));
                let settings = FsSettings::from_defaults(location, &self.fs_defaults);

                let (repository, created) = self.registry.ensure_filesystem(&name, settings)?;
                tracing::info!(
                    repository = %repository.name,
                    created,
                    previous_age_days = ?previous_age_days,
                    "rolled over to a new backup repository"
                );
                Ok(TargetSelection {
                    repository,
                    created,
                    previous_age_days,
                })
            }
        }
    }

    /// Start a snapshot named after the current local time.
    ///
    /// Does not wait for the snapshot to complete.
    pub fn create_backup(
        &self,
        repository: &Repository,
        options: SnapshotOptions,
    ) -> BackupResult<Snapshot> {
        let name = naming::snapshot_name(self.clock.now());
        self.snapshots.create(&repository.name, &name, options)
    }

    /// Delete every `<prefix>_<date>` repository older than the policy's
    /// maximum age.
    ///
    /// A failed deletion is recorded in the report and does not stop the
    /// remaining deletions. Only a failure to list repositories is an error.
    pub fn prune_aged_repositories(
        &self,
        prefix: &str,
        policy: &RetentionPolicy,
    ) -> BackupResult<PruneReport> {
        let today = self.clock.today();
        let max_age = policy.max_age_days();
        let mut report = PruneReport::default();

        for dated in self.dated_repositories(prefix)? {
            let name = dated.repository.name.clone();
            let age = naming::age_in_days(today, dated.date);

            if age <= max_age {
                report.retained.push(name);
                continue;
            }

            tracing::info!(repository = %name, age_days = age, max_age, "aging out backup repository");
            match self.registry.delete(&dated.repository) {
                Ok(()) => report.deleted.push(name),
                Err(error) => {
                    tracing::warn!(repository = %name, %error, "failed to age out backup repository");
                    report.failures.push(PruneFailure {
                        repository: name,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Select a repository, snapshot into it, then age out old repositories.
    ///
    /// Failing to select the target, or losing the connection while
    /// snapshotting, aborts the run. A snapshot request the cluster rejects
    /// is recorded in the outcome and pruning still runs.
    pub fn run_scheduled(&self, plan: &ScheduledBackup) -> BackupResult<ScheduledBackupOutcome> {
        if plan.repository_type != RepositoryType::Fs {
            return Err(BackupError::Unsupported(plan.repository_type.to_string()));
        }

        let target = self.select_target_repository(
            &plan.prefix,
            plan.policy.full_backup_life,
            &plan.base_path,
        )?;
        let snapshot = match self.create_backup(&target.repository, plan.options.clone()) {
            Err(error @ BackupError::RemoteUnavailable { .. }) => return Err(error),
            Err(error) => {
                tracing::warn!(
                    repository = %target.repository.name,
                    %error,
                    "snapshot failed, aging out old repositories anyway"
                );
                Err(error)
            }
            Ok(snapshot) => Ok(snapshot),
        };
        let prune = self.prune_aged_repositories(&plan.prefix, &plan.policy)?;

        Ok(ScheduledBackupOutcome {
            target,
            snapshot,
            prune,
        })
    }
}
