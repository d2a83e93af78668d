//! Snapshot CLI commands
//!
//! Implements CLI commands for snapshot management.

use std::time::Duration;

use clap::{Args, Subcommand};

use crate::client::SnapshotApi;
use crate::config::Settings;
use crate::display::snapshot::{format_snapshot_details, format_snapshot_list};
use crate::error::{BackupError, BackupResult};
use crate::models::{SnapshotOptions, ALL_INDICES};
use crate::services::{RepositoryRegistry, SnapshotManager};

/// Flags shared by every command that takes a snapshot.
///
/// Each flag moves away from the configured default; leaving it off keeps
/// the value from the `default` settings section.
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotFlags {
    /// Allow snapshot creation to continue if an index does not exist
    #[arg(long)]
    pub ignore_unavailable: bool,

    /// Leave the cluster global state out of the snapshot
    #[arg(long)]
    pub no_global_state: bool,

    /// Permit snapshot creation when not all primary shards are available
    #[arg(long)]
    pub partial: bool,
}

impl SnapshotFlags {
    /// Combine the flags with configured defaults
    pub fn resolve(&self, indices: String, settings: &Settings) -> SnapshotOptions {
        SnapshotOptions {
            indices,
            ignore_unavailable: self.ignore_unavailable || settings.default.ignore_unavailable,
            include_global_state: !self.no_global_state && settings.default.include_global_state,
            partial: self.partial || settings.default.partial,
        }
    }
}

/// Snapshot subcommands
#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List snapshots in a repository
    List {
        /// Name of repository
        repository: String,
    },

    /// Show details of a snapshot
    Details {
        /// Name of repository
        repository: String,
        /// Name of snapshot
        snapshot: String,
    },

    /// Create a snapshot
    Create {
        /// Name of repository
        repository: String,
        /// Name of snapshot
        snapshot: String,
        /// Multi-index syntax formatted list of indices
        #[arg(short, long, default_value = ALL_INDICES)]
        indices: String,
        #[command(flatten)]
        flags: SnapshotFlags,
        /// Wait until the snapshot has finished
        #[arg(short, long)]
        wait: bool,
        /// Status checks before giving up when waiting
        #[arg(long, default_value = "120")]
        wait_attempts: u32,
        /// Seconds between status checks when waiting
        #[arg(long, default_value = "5")]
        wait_interval: u64,
    },

    /// Delete a snapshot
    Delete {
        /// Name of repository
        repository: String,
        /// Name of snapshot
        snapshot: String,
    },
}

/// Handle a snapshot command
pub fn handle_snapshot_command(
    api: &SnapshotApi,
    settings: &Settings,
    cmd: SnapshotCommands,
) -> BackupResult<()> {
    let registry = RepositoryRegistry::new(api);
    let manager = SnapshotManager::new(api);

    match cmd {
        SnapshotCommands::List { repository } => {
            registry.require(&repository)?;
            let snapshots = manager.list(&repository)?;
            print!("{}", format_snapshot_list(&repository, &snapshots));
        }

        SnapshotCommands::Details {
            repository,
            snapshot,
        } => {
            let found = manager
                .get(&repository, &snapshot)?
                .ok_or_else(|| BackupError::snapshot_not_found(&repository, &snapshot))?;
            print!("{}", format_snapshot_details(&found));
        }

        SnapshotCommands::Create {
            repository,
            snapshot,
            indices,
            flags,
            wait,
            wait_attempts,
            wait_interval,
        } => {
            let repo = registry.require(&repository)?;
            let options = flags.resolve(indices, settings);
            let mut created = manager.create(&repo.name, &snapshot, options)?;
            println!("Snapshot {} created in repository {}", created.name, repo.name);

            if wait {
                let finished = manager.wait_for_completion(
                    &mut created,
                    wait_attempts,
                    Duration::from_secs(wait_interval),
                )?;
                if !finished {
                    println!("Snapshot {} is still in progress.", created.name);
                }
                print!("{}", format_snapshot_details(&created));
            }
        }

        SnapshotCommands::Delete {
            repository,
            snapshot,
        } => {
            manager.delete(&repository, &snapshot)?;
            println!("Snapshot {} deleted from repository {}", snapshot, repository);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeSnapshotService;
    use crate::client::Method;

    #[test]
    fn test_flags_default_to_settings() {
        let settings = Settings::default();
        let options = SnapshotFlags::default().resolve("_all".into(), &settings);
        assert_eq!(options, SnapshotOptions::default());
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings::default();
        let flags = SnapshotFlags {
            ignore_unavailable: true,
            no_global_state: true,
            partial: true,
        };
        let options = flags.resolve("logs-*".into(), &settings);

        assert_eq!(options.indices, "logs-*");
        assert!(options.ignore_unavailable);
        assert!(!options.include_global_state);
        assert!(options.partial);
    }

    #[test]
    fn test_configured_exclusion_of_global_state() {
        let mut settings = Settings::default();
        settings.default.include_global_state = false;
        let options = SnapshotFlags::default().resolve("_all".into(), &settings);
        assert!(!options.include_global_state);
    }

    #[test]
    fn test_create_requires_repository() {
        let service = FakeSnapshotService::new();
        let api = service.api();

        let err = handle_snapshot_command(
            &api,
            &Settings::default(),
            SnapshotCommands::Create {
                repository: "ghost".into(),
                snapshot: "s1".into(),
                indices: "_all".into(),
                flags: SnapshotFlags::default(),
                wait: false,
                wait_attempts: 1,
                wait_interval: 0,
            },
        )
        .unwrap_err();

        assert!(err.is_not_found());
        assert!(service.mutating_requests().is_empty());
    }

    #[test]
    fn test_create_and_delete() {
        let service = FakeSnapshotService::new();
        service.add_fs_repository("nightly", "/tmp/nightly");
        let api = service.api();
        let settings = Settings::default();

        handle_snapshot_command(
            &api,
            &settings,
            SnapshotCommands::Create {
                repository: "nightly".into(),
                snapshot: "s1".into(),
                indices: "_all".into(),
                flags: SnapshotFlags::default(),
                wait: true,
                wait_attempts: 3,
                wait_interval: 0,
            },
        )
        .unwrap();
        assert_eq!(service.snapshot_names("nightly"), vec!["s1"]);

        handle_snapshot_command(
            &api,
            &settings,
            SnapshotCommands::Delete {
                repository: "nightly".into(),
                snapshot: "s1".into(),
            },
        )
        .unwrap();
        assert!(service.snapshot_names("nightly").is_empty());
    }

    #[test]
    fn test_list_and_details() {
        let service = FakeSnapshotService::new();
        service.add_fs_repository("nightly", "/tmp/nightly");
        let api = service.api();
        SnapshotManager::new(&api)
            .create("nightly", "s1", SnapshotOptions::default())
            .unwrap();
        let settings = Settings::default();

        handle_snapshot_command(
            &api,
            &settings,
            SnapshotCommands::List {
                repository: "nightly".into(),
            },
        )
        .unwrap();
        handle_snapshot_command(
            &api,
            &settings,
            SnapshotCommands::Details {
                repository: "nightly".into(),
                snapshot: "s1".into(),
            },
        )
        .unwrap();

        let requests = service.requests();
        assert!(requests.contains(&(Method::Get, "nightly/_all".to_string())));
        assert!(requests.contains(&(Method::Get, "nightly/s1".to_string())));
    }

    #[test]
    fn test_list_in_missing_repository() {
        let service = FakeSnapshotService::new();
        let api = service.api();

        let err = handle_snapshot_command(
            &api,
            &Settings::default(),
            SnapshotCommands::List {
                repository: "ghost".into(),
            },
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_details_of_missing_snapshot() {
        let service = FakeSnapshotService::new();
        service.add_fs_repository("nightly", "/tmp/nightly");
        let api = service.api();

        let err = handle_snapshot_command(
            &api,
            &Settings::default(),
            SnapshotCommands::Details {
                repository: "nightly".into(),
                snapshot: "missing".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BackupError::NotFound { ref identifier, .. } if identifier == "nightly/missing"
        ));
    }
}
