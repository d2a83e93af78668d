//! Service layer for es-backup
//!
//! Repository and snapshot operations on top of the snapshot API client.

pub mod registry;
pub mod snapshot;

pub use registry::RepositoryRegistry;
pub use snapshot::SnapshotManager;
