//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod repo;
pub mod snapshot;

pub use backup::{handle_scheduled_backup, ScheduledBackupArgs};
pub use repo::{handle_repo_command, CreateRepoCommands, RepoCommands};
pub use snapshot::{handle_snapshot_command, SnapshotCommands, SnapshotFlags};
