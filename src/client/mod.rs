//! Remote resource client for the snapshot API
//!
//! - `transport`: the HTTP seam (`Transport` trait and the reqwest implementation)
//! - `types`: request and response bodies
//! - `api`: one typed call per `_snapshot` endpoint

pub mod api;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::SnapshotApi;
pub use transport::{HttpResponse, Method, ReqwestTransport, Transport, TransportError};
pub use types::{RepositoryInfo, RepositoryMap, ShardStats, SnapshotInfo, SnapshotList, SnapshotRequest};
