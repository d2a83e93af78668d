//! Snapshot service
//!
//! Creates, reads and deletes snapshots inside one repository.

use std::thread;
use std::time::Duration;

use crate::client::SnapshotApi;
use crate::error::{BackupError, BackupResult};
use crate::models::{Snapshot, SnapshotOptions};

/// Service for snapshot management
pub struct SnapshotManager<'a> {
    api: &'a SnapshotApi,
}

impl<'a> SnapshotManager<'a> {
    /// Create a new snapshot manager
    pub fn new(api: &'a SnapshotApi) -> Self {
        Self { api }
    }

    /// Start a snapshot and read back whatever status the cluster has so far.
    ///
    /// Does not wait for the snapshot to complete.
    pub fn create(
        &self,
        repository: &str,
        name: &str,
        options: SnapshotOptions,
    ) -> BackupResult<Snapshot> {
        self.api.put_snapshot(repository, name, &options.to_request())?;
        tracing::info!(repository, snapshot = name, indices = %options.indices, "snapshot started");

        let mut snapshot = Snapshot::new(repository, name, options);
        if let Some(info) = self.api.get_snapshot(repository, name)? {
            snapshot.apply_info(&info);
        }
        Ok(snapshot)
    }

    /// Get a snapshot by name
    pub fn get(&self, repository: &str, name: &str) -> BackupResult<Option<Snapshot>> {
        Ok(self
            .api
            .get_snapshot(repository, name)?
            .map(|info| Snapshot::from_info(repository, &info)))
    }

    /// All snapshots stored in a repository
    pub fn list(&self, repository: &str) -> BackupResult<Vec<Snapshot>> {
        Ok(self
            .api
            .list_snapshots(repository)?
            .iter()
            .map(|info| Snapshot::from_info(repository, info))
            .collect())
    }

    /// Re-read the observed status of a snapshot
    pub fn refresh(&self, snapshot: &mut Snapshot) -> BackupResult<()> {
        let info = self
            .api
            .get_snapshot(&snapshot.repository, &snapshot.name)?
            .ok_or_else(|| BackupError::snapshot_not_found(&snapshot.repository, &snapshot.name))?;
        snapshot.apply_info(&info);
        Ok(())
    }

    /// Poll until the snapshot has finished, at most `attempts` times.
    ///
    /// Returns whether the snapshot finished within the allowed attempts.
    pub fn wait_for_completion(
        &self,
        snapshot: &mut Snapshot,
        attempts: u32,
        interval: Duration,
    ) -> BackupResult<bool> {
        for attempt in 0..attempts {
            if attempt > 0 {
                thread::sleep(interval);
            }
            self.refresh(snapshot)?;
            if snapshot.is_finished() {
                return Ok(true);
            }
            tracing::debug!(snapshot = %snapshot.name, attempt, "snapshot still in progress");
        }
        Ok(snapshot.is_finished())
    }

    /// Delete a snapshot
    pub fn delete(&self, repository: &str, name: &str) -> BackupResult<()> {
        self.api.delete_snapshot(repository, name)?;
        tracing::info!(repository, snapshot = name, "deleted snapshot");
        Ok(())
    }
}
