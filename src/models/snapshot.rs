//! Snapshot model
//!
//! A snapshot is a point-in-time copy of selected indices, stored in exactly
//! one repository. Snapshot creation is asynchronous on the cluster side, so
//! the observed status is optional and refreshed by reading it back.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::client::{ShardStats, SnapshotInfo, SnapshotRequest};

/// Index expression meaning "every index"
pub const ALL_INDICES: &str = "_all";

/// Options controlling how a snapshot is taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Comma separated multi-index expression, or `_all`
    pub indices: String,
    /// Continue if an index in `indices` does not exist
    pub ignore_unavailable: bool,
    /// Store the cluster global state alongside the indices
    pub include_global_state: bool,
    /// Permit snapshots of indices whose primaries are not all available
    pub partial: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            indices: ALL_INDICES.to_string(),
            ignore_unavailable: false,
            include_global_state: true,
            partial: false,
        }
    }
}

impl SnapshotOptions {
    pub fn to_request(&self) -> SnapshotRequest {
        SnapshotRequest {
            indices: self.indices.clone(),
            ignore_unavailable: self.ignore_unavailable,
            include_global_state: self.include_global_state,
            partial: self.partial,
        }
    }
}

/// State reported by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState {
    InProgress,
    Success,
    Partial,
    Failed,
    Incompatible,
    Other(String),
}

impl SnapshotState {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" | "STARTED" => Self::InProgress,
            "SUCCESS" => Self::Success,
            "PARTIAL" => Self::Partial,
            "FAILED" => Self::Failed,
            "INCOMPATIBLE" => Self::Incompatible,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Whether the cluster has stopped working on the snapshot
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Failed => write!(f, "FAILED"),
            Self::Incompatible => write!(f, "INCOMPATIBLE"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Fields observed after the snapshot was created
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStatus {
    /// Indices contained in the snapshot, comma joined, or `_all`
    pub indices: String,
    pub state: SnapshotState,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Duration in seconds
    pub duration_secs: Option<f64>,
    pub failures: Vec<Value>,
    pub shards: Option<ShardStats>,
}

impl SnapshotStatus {
    pub fn from_info(info: &SnapshotInfo) -> Self {
        Self {
            indices: join_indices(&info.indices),
            state: info
                .state
                .as_deref()
                .map(SnapshotState::parse)
                .unwrap_or(SnapshotState::InProgress),
            start_time: info.start_time,
            end_time: info.end_time,
            duration_secs: info.duration_in_millis.map(|ms| ms as f64 / 1000.0),
            failures: info.failures.clone(),
            shards: info.shards,
        }
    }
}

/// A snapshot inside a repository
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Name of the owning repository
    pub repository: String,
    /// Unique name within the repository
    pub name: String,
    pub options: SnapshotOptions,
    /// `None` until the snapshot has been read back from the cluster
    pub status: Option<SnapshotStatus>,
}

impl Snapshot {
    pub fn new(repository: impl Into<String>, name: impl Into<String>, options: SnapshotOptions) -> Self {
        Self {
            repository: repository.into(),
            name: name.into(),
            options,
            status: None,
        }
    }

    /// Build a snapshot handle from what the cluster reported
    pub fn from_info(repository: &str, info: &SnapshotInfo) -> Self {
        let status = SnapshotStatus::from_info(info);
        let options = SnapshotOptions {
            indices: status.indices.clone(),
            ..SnapshotOptions::default()
        };
        Self {
            repository: repository.to_string(),
            name: info.snapshot.clone(),
            options,
            status: Some(status),
        }
    }

    /// Replace the observed status with a fresh read
    pub fn apply_info(&mut self, info: &SnapshotInfo) {
        let status = SnapshotStatus::from_info(info);
        self.options.indices = status.indices.clone();
        self.status = Some(status);
    }

    pub fn state(&self) -> Option<&SnapshotState> {
        self.status.as_ref().map(|s| &s.state)
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_some_and(SnapshotState::is_finished)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot {} of repo {}", self.name, self.repository)
    }
}

fn join_indices(indices: &[String]) -> String {
    if indices.is_empty() {
        ALL_INDICES.to_string()
    } else {
        indices.join(",")
    }
}
