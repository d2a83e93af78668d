//! Snapshot API client
//!
//! Maps each `_snapshot` endpoint onto a typed call. Reads that come back
//! with a non-2xx status mean "does not exist" and return `Ok(None)`;
//! failed writes are errors naming the resource and operation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{HttpResponse, Method, ReqwestTransport, Transport};
use super::types::{RepositoryInfo, RepositoryMap, SnapshotInfo, SnapshotList, SnapshotRequest};
use crate::config::Settings;
use crate::error::{BackupError, BackupResult};

/// Client for the `_snapshot` family of endpoints
pub struct SnapshotApi {
    transport: Box<dyn Transport>,
    base_url: String,
}

impl SnapshotApi {
    /// Create a client over any transport
    pub fn new(base_url: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Create a reqwest backed client from the loaded settings
    pub fn from_settings(settings: &Settings) -> BackupResult<Self> {
        let base_url = settings.base_url()?;
        let transport =
            ReqwestTransport::new(Duration::from_secs(settings.default.timeout_secs))?;
        Ok(Self::new(base_url, Box::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn repository_url(&self, name: &str) -> String {
        format!("{}/_snapshot/{}", self.base_url, name)
    }

    fn snapshot_url(&self, repository: &str, snapshot: &str) -> String {
        format!("{}/_snapshot/{}/{}", self.base_url, repository, snapshot)
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        operation: &'static str,
        resource: &str,
    ) -> BackupResult<HttpResponse> {
        tracing::debug!(%method, url, "snapshot api request");

        let response = self
            .transport
            .execute(method, url, body)
            .map_err(|e| BackupError::RemoteUnavailable {
                operation,
                resource: resource.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(%method, url, status = response.status, "snapshot api response");
        Ok(response)
    }

    /// List every registered repository
    pub fn list_repositories(&self) -> BackupResult<RepositoryMap> {
        let resource = "repository list";
        let response = self.send(
            Method::Get,
            &self.repository_url("_all"),
            None,
            "read",
            resource,
        )?;
        if !response.is_success() {
            return Err(rejected("read", resource, &response));
        }
        decode(&response, resource)
    }

    /// Fetch one repository, `None` if the service does not know it
    pub fn get_repository(&self, name: &str) -> BackupResult<Option<RepositoryInfo>> {
        let resource = format!("repository {}", name);
        let response = self.send(
            Method::Get,
            &self.repository_url(name),
            None,
            "read",
            &resource,
        )?;
        if !response.is_success() {
            return Ok(None);
        }

        let mut repos: RepositoryMap = decode(&response, &resource)?;
        repos
            .remove(name)
            .map(Some)
            .ok_or_else(|| BackupError::MalformedResponse {
                resource,
                message: format!("response does not describe '{}'", name),
            })
    }

    /// Register a repository
    pub fn put_repository(&self, name: &str, info: &RepositoryInfo) -> BackupResult<()> {
        let resource = format!("repository {}", name);
        let body = serde_json::to_value(info)?;
        let response = self.send(
            Method::Put,
            &self.repository_url(name),
            Some(&body),
            "create",
            &resource,
        )?;
        if !response.is_success() {
            return Err(rejected("create", &resource, &response));
        }
        Ok(())
    }

    /// Unregister a repository
    pub fn delete_repository(&self, name: &str) -> BackupResult<()> {
        let resource = format!("repository {}", name);
        let response = self.send(
            Method::Delete,
            &self.repository_url(name),
            None,
            "delete",
            &resource,
        )?;
        if response.status >= 400 {
            return Err(rejected("delete", &resource, &response));
        }
        Ok(())
    }

    /// List every snapshot stored in a repository
    pub fn list_snapshots(&self, repository: &str) -> BackupResult<Vec<SnapshotInfo>> {
        let resource = format!("snapshots of {}", repository);
        let response = self.send(
            Method::Get,
            &self.snapshot_url(repository, "_all"),
            None,
            "read",
            &resource,
        )?;
        if !response.is_success() {
            return Err(rejected("read", &resource, &response));
        }
        let list: SnapshotList = decode(&response, &resource)?;
        Ok(list.snapshots)
    }

    /// Fetch one snapshot, `None` if it does not exist
    pub fn get_snapshot(
        &self,
        repository: &str,
        snapshot: &str,
    ) -> BackupResult<Option<SnapshotInfo>> {
        let resource = format!("snapshot {}/{}", repository, snapshot);
        let response = self.send(
            Method::Get,
            &self.snapshot_url(repository, snapshot),
            None,
            "read",
            &resource,
        )?;
        if !response.is_success() {
            return Ok(None);
        }
        let list: SnapshotList = decode(&response, &resource)?;
        Ok(list.snapshots.into_iter().next())
    }

    /// Start a snapshot. Returns as soon as the service accepted the request.
    pub fn put_snapshot(
        &self,
        repository: &str,
        snapshot: &str,
        request: &SnapshotRequest,
    ) -> BackupResult<()> {
        let resource = format!("snapshot {}/{}", repository, snapshot);
        let body = serde_json::to_value(request)?;
        let response = self.send(
            Method::Put,
            &self.snapshot_url(repository, snapshot),
            Some(&body),
            "create",
            &resource,
        )?;
        if !response.is_success() {
            return Err(rejected("create", &resource, &response));
        }
        Ok(())
    }

    /// Delete a snapshot
    pub fn delete_snapshot(&self, repository: &str, snapshot: &str) -> BackupResult<()> {
        let resource = format!("snapshot {}/{}", repository, snapshot);
        let response = self.send(
            Method::Delete,
            &self.snapshot_url(repository, snapshot),
            None,
            "delete",
            &resource,
        )?;
        if response.status >= 400 {
            return Err(rejected("delete", &resource, &response));
        }
        Ok(())
    }
}

fn rejected(operation: &'static str, resource: &str, response: &HttpResponse) -> BackupError {
    tracing::debug!(status = response.status, body = %response.body, "rejected by snapshot api");
    BackupError::RemoteRejected {
        operation,
        resource: resource.to_string(),
        status: response.status,
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, resource: &str) -> BackupResult<T> {
    serde_json::from_str(&response.body).map_err(|e| BackupError::MalformedResponse {
        resource: resource.to_string(),
        message: e.to_string(),
    })
}
