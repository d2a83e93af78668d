//! Wire types for the snapshot API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One repository as reported by `GET _snapshot/<name>` and accepted by
/// `PUT _snapshot/<name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    #[serde(rename = "type")]
    pub repository_type: String,

    /// Type specific settings. The service reports every value as a string.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

/// Repository name to metadata, as returned by `GET _snapshot/_all`
pub type RepositoryMap = BTreeMap<String, RepositoryInfo>;

/// Body of `PUT _snapshot/<repo>/<snapshot>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub indices: String,
    pub ignore_unavailable: bool,
    pub include_global_state: bool,
    pub partial: bool,
}

/// Envelope returned by snapshot reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotList {
    #[serde(default)]
    pub snapshots: Vec<SnapshotInfo>,
}

/// A single snapshot as reported by the service
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotInfo {
    pub snapshot: String,

    #[serde(default)]
    pub indices: Vec<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    /// Absent while the snapshot is still running
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_in_millis: Option<u64>,

    #[serde(default)]
    pub failures: Vec<Value>,

    #[serde(default)]
    pub shards: Option<ShardStats>,
}

/// Shard counters of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub successful: u32,
}
