//! Scheduled backups with dated repositories
//!
//! A "full backup" is one repository named `<prefix>_<YYYYMMDD>`. Each
//! scheduled run snapshots into the most recent full backup, rolls over to a
//! new one once it is older than the configured life, and deletes full
//! backups older than `count * life` days.
//!
//! # Architecture
//!
//! - `RetentionPolicy`: count and life of full backups
//! - `naming`: dated names, date parsing and the `Clock` used for "today"
//! - `BackupEngine`: target selection, snapshotting and pruning
//!
//! # Example
//!
//! ```rust,ignore
//! use es_backup::backup::{BackupEngine, RetentionPolicy, SystemClock};
//!
//! let clock = SystemClock;
//! let engine = BackupEngine::new(&api, &clock);
//! let target = engine.select_target_repository("backup", 7, base_path)?;
//! engine.create_backup(&target.repository, SnapshotOptions::default())?;
//! engine.prune_aged_repositories("backup", &RetentionPolicy::new(4, 7)?)?;
//! ```

mod engine;
pub mod naming;
mod policy;

pub use engine::{
    BackupEngine, DatedRepository, PruneFailure, PruneReport, ScheduledBackup,
    ScheduledBackupOutcome, TargetSelection,
};
pub use naming::{Clock, FixedClock, SystemClock};
pub use policy::RetentionPolicy;
