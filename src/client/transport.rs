//! HTTP transport abstraction for the snapshot API.
//!
//! The transport is the only place that touches the network. Everything above
//! it speaks in terms of [`HttpResponse`] values, so tests can swap in an
//! in-memory service.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::error::{BackupError, BackupResult};

/// HTTP verbs used by the snapshot API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    /// Whether the request changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response (connection refused, DNS, timeout)
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes a single HTTP request against the snapshot API.
pub trait Transport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Production transport using a blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> BackupResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackupError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
