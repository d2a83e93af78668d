//! Scheduled backup CLI command
//!
//! Runs one backup cycle: pick (or roll over) the dated repository, start a
//! snapshot in it, then age out old repositories.

use std::path::PathBuf;

use clap::Args;

use super::snapshot::SnapshotFlags;
use crate::backup::{BackupEngine, Clock, RetentionPolicy, ScheduledBackup};
use crate::client::SnapshotApi;
use crate::config::Settings;
use crate::error::{BackupError, BackupResult};
use crate::models::RepositoryType;

/// Arguments of `scheduled-backup`; anything left out comes from the settings file
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduledBackupArgs {
    /// Backup repository type (fs, s3, azure, hdfs)
    #[arg(short = 't', long = "type")]
    pub repository_type: Option<String>,

    /// Full backup count to retain
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Life time of a backup in days before a new full backup is taken
    #[arg(short, long)]
    pub life: Option<u32>,

    /// Base path of backup repositories
    #[arg(short, long)]
    pub base_path: Option<PathBuf>,

    /// Backup repository name prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Multi-index syntax formatted list of indices
    #[arg(short, long)]
    pub indices: Option<String>,

    #[command(flatten)]
    pub flags: SnapshotFlags,
}

impl ScheduledBackupArgs {
    /// Merge command line values over configured defaults
    pub fn to_plan(&self, settings: &Settings) -> BackupResult<ScheduledBackup> {
        let repository_type = match &self.repository_type {
            Some(t) => RepositoryType::parse(t).ok_or_else(|| {
                BackupError::Validation(format!(
                    "Invalid backup type: '{}'. Valid types: fs, s3, azure, hdfs",
                    t
                ))
            })?,
            None => settings.backup.backup_type,
        };

        let policy = RetentionPolicy::new(
            self.count.unwrap_or(settings.backup.full_backup_count),
            self.life.unwrap_or(settings.backup.full_backup_life),
        )?;

        let indices = self
            .indices
            .clone()
            .unwrap_or_else(|| settings.backup.indices.clone());

        Ok(ScheduledBackup {
            repository_type,
            policy,
            base_path: self
                .base_path
                .clone()
                .unwrap_or_else(|| settings.fs.backup_base_path.clone()),
            prefix: self
                .prefix
                .clone()
                .unwrap_or_else(|| settings.backup.prefix.clone()),
            options: self.flags.resolve(indices, settings),
        })
    }
}

/// Handle the scheduled-backup command
pub fn handle_scheduled_backup(
    api: &SnapshotApi,
    settings: &Settings,
    clock: &dyn Clock,
    args: &ScheduledBackupArgs,
) -> BackupResult<()> {
    let plan = args.to_plan(settings)?;
    let engine = BackupEngine::new(api, clock).with_fs_defaults(settings.fs.clone());

    let outcome = engine.run_scheduled(&plan)?;

    let repo = &outcome.target.repository;
    let location = repo
        .location()
        .map(|l| l.display().to_string())
        .unwrap_or_default();
    if outcome.target.created {
        println!("New backup repo {} created at {}", repo.name, location);
    } else {
        println!("Using backup repo {} at {}", repo.name, location);
    }
    if let Ok(snapshot) = &outcome.snapshot {
        println!(
            "Snapshot {} created in repository {}",
            snapshot.name, repo.name
        );
    }

    for name in &outcome.prune.deleted {
        println!("Aged out backup repository {}", name);
    }
    for failure in &outcome.prune.failures {
        eprintln!(
            "Failed to age out backup repository {}: {}",
            failure.repository, failure.error
        );
    }
    println!(
        "{} backup repositories within retention",
        outcome.prune.retained.len()
    );

    outcome.snapshot?;
    if !outcome.prune.is_complete() {
        return Err(BackupError::PartialPrune {
            failed: outcome.prune.failures.len(),
            attempted: outcome.prune.attempted(),
        });
    }

    Ok(())
}
