//! Core data models for es-backup
//!
//! Repositories and the snapshots stored in them.

pub mod repository;
pub mod snapshot;

pub use repository::{FsSettings, Repository, RepositorySettings, RepositoryType};
pub use snapshot::{Snapshot, SnapshotOptions, SnapshotState, SnapshotStatus, ALL_INDICES};
