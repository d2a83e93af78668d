//! Repository CLI commands
//!
//! Implements CLI commands for repository management.

use std::path::PathBuf;

use clap::Subcommand;

use crate::client::SnapshotApi;
use crate::config::Settings;
use crate::display::repository::{format_repository_details, format_repository_list};
use crate::error::{BackupError, BackupResult};
use crate::models::{FsSettings, RepositoryType};
use crate::services::RepositoryRegistry;

/// Repository subcommands
#[derive(Subcommand)]
pub enum RepoCommands {
    /// List all repositories
    List,

    /// Show repository details
    Details {
        /// Name of repository
        name: String,
    },

    /// Create a snapshot repository
    #[command(subcommand)]
    Create(CreateRepoCommands),

    /// Delete a repository (filesystem repositories also lose their files)
    Delete {
        /// Name of repository
        name: String,
    },
}

/// Repository types that can be created
#[derive(Subcommand)]
pub enum CreateRepoCommands {
    /// Shared filesystem repository
    Fs {
        /// Name of repository
        name: String,
        /// Path of repository
        #[arg(short, long)]
        location: PathBuf,
        /// Enable metadata file compression
        #[arg(short = 'c', long, overrides_with = "no_compress")]
        compress: bool,
        /// Disable metadata file compression
        #[arg(long, overrides_with = "compress")]
        no_compress: bool,
        /// Break large files into smaller chunks (e.g. 1g, 10m, 5k)
        #[arg(short = 'C', long)]
        chunk_size: Option<String>,
        /// Max rate of restore (e.g. 20mb)
        #[arg(short, long)]
        restore_rate: Option<String>,
        /// Max rate of snapshot creation (e.g. 20mb)
        #[arg(short, long)]
        snapshot_rate: Option<String>,
    },

    /// Amazon S3 repository
    S3 {
        /// Name of repository
        name: String,
    },

    /// Azure blob storage repository
    Azure {
        /// Name of repository
        name: String,
    },

    /// HDFS repository
    Hdfs {
        /// Name of repository
        name: String,
    },
}

/// Handle a repository command
pub fn handle_repo_command(
    api: &SnapshotApi,
    settings: &Settings,
    cmd: RepoCommands,
) -> BackupResult<()> {
    let registry = RepositoryRegistry::new(api);

    match cmd {
        RepoCommands::List => {
            let repositories = registry.list(None)?;
            print!("{}", format_repository_list(&repositories));
        }

        RepoCommands::Details { name } => {
            let repository = registry.require(&name)?;
            print!("{}", format_repository_details(&repository));
        }

        RepoCommands::Create(CreateRepoCommands::Fs {
            name,
            location,
            compress,
            no_compress,
            chunk_size,
            restore_rate,
            snapshot_rate,
        }) => {
            let mut fs_settings = FsSettings::from_defaults(location, &settings.fs);
            if compress {
                fs_settings.compress = true;
            } else if no_compress {
                fs_settings.compress = false;
            }
            if let Some(chunk_size) = chunk_size {
                // "null" clears a configured chunk size
                fs_settings.chunk_size = (chunk_size != "null").then_some(chunk_size);
            }
            if let Some(rate) = restore_rate {
                fs_settings.restore_rate = rate;
            }
            if let Some(rate) = snapshot_rate {
                fs_settings.snapshot_rate = rate;
            }

            let (repository, created) = registry.ensure_filesystem(&name, fs_settings)?;
            let location = repository
                .location()
                .map(|l| l.display().to_string())
                .unwrap_or_default();
            if created {
                println!(
                    "Filesystem repository {} created at {}",
                    repository.name, location
                );
            } else {
                println!(
                    "Repository {} already exists at {}",
                    repository.name, location
                );
            }
        }

        RepoCommands::Create(CreateRepoCommands::S3 { .. }) => {
            return Err(BackupError::Unsupported(RepositoryType::S3.to_string()));
        }
        RepoCommands::Create(CreateRepoCommands::Azure { .. }) => {
            return Err(BackupError::Unsupported(RepositoryType::Azure.to_string()));
        }
        RepoCommands::Create(CreateRepoCommands::Hdfs { .. }) => {
            return Err(BackupError::Unsupported(RepositoryType::Hdfs.to_string()));
        }

        RepoCommands::Delete { name } => {
            let repository = registry.require(&name)?;
            registry.delete(&repository)?;
            println!("Repository {} deleted", repository.name);
        }
    }

    Ok(())
}
