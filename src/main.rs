use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use es_backup::backup::SystemClock;
use es_backup::cli::{
    handle_repo_command, handle_scheduled_backup, handle_snapshot_command, RepoCommands,
    ScheduledBackupArgs, SnapshotCommands,
};
use es_backup::client::SnapshotApi;
use es_backup::config::{ConfigPaths, Settings};

#[derive(Parser)]
#[command(
    name = "es-backup",
    version,
    about = "Elasticsearch backup management utility",
    long_about = "es-backup manages snapshot repositories and snapshots of an \
                  Elasticsearch cluster. Run 'scheduled-backup' from cron to keep \
                  a rolling set of dated full backups."
)]
struct Cli {
    /// Snapshot API root, e.g. http://localhost:9200 (overrides default.base_url)
    #[arg(long, global = true, env = "ES_BACKUP_URL")]
    base_url: Option<String>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Repository management commands
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Snapshot management commands
    #[command(subcommand)]
    Snapshot(SnapshotCommands),

    /// Snapshot into the current full backup and age out old ones
    ScheduledBackup(ScheduledBackupArgs),

    /// Write a settings file pointing at a cluster
    Init {
        /// Snapshot API root, e.g. http://localhost:9200
        url: String,
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = ConfigPaths::new()?;

    if let Some(Commands::Init { url, force }) = &cli.command {
        let settings_path = paths.settings_file();
        if settings_path.exists() && !force {
            anyhow::bail!(
                "Settings file already exists at {} (use --force to overwrite)",
                settings_path.display()
            );
        }
        let settings = Settings::default().with_base_url_override(Some(url.clone()));
        settings.save(&paths)?;
        println!("Settings written to {}", settings_path.display());
        return Ok(());
    }

    let settings = Settings::load_or_default(&paths)?.with_base_url_override(cli.base_url);

    match cli.command {
        Some(Commands::Repo(cmd)) => {
            let api = SnapshotApi::from_settings(&settings)?;
            handle_repo_command(&api, &settings, cmd)?;
        }
        Some(Commands::Snapshot(cmd)) => {
            let api = SnapshotApi::from_settings(&settings)?;
            handle_snapshot_command(&api, &settings, cmd)?;
        }
        Some(Commands::ScheduledBackup(args)) => {
            let api = SnapshotApi::from_settings(&settings)?;
            handle_scheduled_backup(&api, &settings, &SystemClock, &args)?;
        }
        Some(Commands::Init { .. }) => {}
        Some(Commands::Config) => {
            println!("es-backup Configuration");
            println!("=======================");
            println!("Settings file: {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!(
                "  Base URL:            {}",
                settings.default.base_url.as_deref().unwrap_or("(not set)")
            );
            println!("  Timeout:             {}s", settings.default.timeout_secs);
            println!("  Ignore unavailable:  {}", settings.default.ignore_unavailable);
            println!("  Include global state: {}", settings.default.include_global_state);
            println!("  Partial:             {}", settings.default.partial);
            println!("  Backup type:         {}", settings.backup.backup_type);
            println!("  Backup prefix:       {}", settings.backup.prefix);
            println!("  Full backup count:   {}", settings.backup.full_backup_count);
            println!("  Full backup life:    {} days", settings.backup.full_backup_life);
            println!("  Backup indices:      {}", settings.backup.indices);
            println!(
                "  Backup base path:    {}",
                settings.fs.backup_base_path.display()
            );
        }
        None => {
            println!("es-backup - Elasticsearch backup management");
            println!();
            println!("Run 'es-backup --help' for usage information.");
        }
    }

    Ok(())
}
