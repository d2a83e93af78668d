//! In-memory snapshot service for tests.
//!
//! Behaves like the `_snapshot` endpoints of a search cluster closely enough
//! for the registry, snapshot manager and retention engine to run against it,
//! and records every request it receives.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};

use super::api::SnapshotApi;
use super::transport::{HttpResponse, Method, Transport, TransportError};

pub const FAKE_BASE_URL: &str = "http://fake-cluster:9200";

#[derive(Default)]
struct StoredSnapshot {
    info: Value,
    pending_reads: u32,
}

#[derive(Default)]
struct State {
    repositories: BTreeMap<String, Value>,
    snapshots: BTreeMap<String, BTreeMap<String, StoredSnapshot>>,
    requests: Vec<(Method, String)>,
    bodies: Vec<Value>,
    overrides: HashMap<(Method, String), (u16, String)>,
    pending_reads: u32,
    unreachable: bool,
}

/// Shared handle to the fake service; clones see the same state.
#[derive(Clone, Default)]
pub struct FakeSnapshotService {
    state: Arc<Mutex<State>>,
}

impl FakeSnapshotService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client wired to this service
    pub fn api(&self) -> SnapshotApi {
        SnapshotApi::new(FAKE_BASE_URL, Box::new(self.clone()))
    }

    /// Register a filesystem repository directly, without recording a request
    pub fn add_fs_repository(&self, name: &str, location: &str) {
        self.add_repository(
            name,
            json!({"type": "fs", "settings": {"location": location, "compress": "true"}}),
        );
    }

    pub fn add_repository(&self, name: &str, info: Value) {
        let mut state = self.state.lock().unwrap();
        state.repositories.insert(name.to_string(), info);
        state.snapshots.entry(name.to_string()).or_default();
    }

    /// Answer `method path` with a fixed error status
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.respond(method, path, status, r#"{"error": "injected"}"#);
    }

    /// Answer `method path` with a fixed response
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .overrides
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Newly created snapshots report IN_PROGRESS for this many reads
    pub fn set_pending_reads(&self, reads: u32) {
        self.state.lock().unwrap().pending_reads = reads;
    }

    /// Every request as `(method, path below _snapshot/)`
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn mutating_requests(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .filter(|(method, _)| method.is_mutating())
            .collect()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.lock().unwrap().bodies.last().cloned()
    }

    pub fn repository_names(&self) -> Vec<String> {
        self.state.lock().unwrap().repositories.keys().cloned().collect()
    }

    pub fn repository(&self, name: &str) -> Option<Value> {
        self.state.lock().unwrap().repositories.get(name).cloned()
    }

    pub fn snapshot_names(&self, repository: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .snapshots
            .get(repository)
            .map(|snaps| snaps.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl State {
    fn handle(&mut self, method: Method, path: &str, body: Option<&Value>) -> HttpResponse {
        let segments: Vec<&str> = path.split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Get, ["_all"]) => {
                let all: Map<String, Value> = self.repositories.clone().into_iter().collect();
                HttpResponse::new(200, Value::Object(all).to_string())
            }
            (Method::Get, [name]) => match self.repositories.get(*name) {
                Some(info) => {
                    let mut one = Map::new();
                    one.insert(name.to_string(), info.clone());
                    HttpResponse::new(200, Value::Object(one).to_string())
                }
                None => missing(name),
            },
            (Method::Put, [name]) => {
                let info = body.cloned().unwrap_or(Value::Null);
                self.repositories.insert(name.to_string(), info);
                self.snapshots.entry(name.to_string()).or_default();
                acknowledged()
            }
            (Method::Delete, [name]) => match self.repositories.remove(*name) {
                Some(_) => {
                    self.snapshots.remove(*name);
                    acknowledged()
                }
                None => missing(name),
            },
            (Method::Get, [repo, "_all"]) => match self.snapshots.get(*repo) {
                Some(snaps) => {
                    let list: Vec<Value> = snaps.values().map(|s| s.info.clone()).collect();
                    HttpResponse::new(200, json!({ "snapshots": list }).to_string())
                }
                None => missing(repo),
            },
            (Method::Get, [repo, snap]) => {
                match self.snapshots.get_mut(*repo).and_then(|s| s.get_mut(*snap)) {
                    Some(stored) => {
                        let info = if stored.pending_reads > 0 {
                            stored.pending_reads -= 1;
                            in_progress(&stored.info)
                        } else {
                            stored.info.clone()
                        };
                        HttpResponse::new(200, json!({ "snapshots": [info] }).to_string())
                    }
                    None => missing(snap),
                }
            }
            (Method::Put, [repo, snap]) => {
                let pending_reads = self.pending_reads;
                let Some(snaps) = self.snapshots.get_mut(*repo) else {
                    return missing(repo);
                };
                if snaps.contains_key(*snap) {
                    return HttpResponse::new(400, r#"{"error": "invalid_snapshot_name_exception"}"#);
                }
                let indices = body
                    .and_then(|b| b.get("indices"))
                    .and_then(Value::as_str)
                    .unwrap_or("_all");
                snaps.insert(
                    snap.to_string(),
                    StoredSnapshot {
                        info: completed_snapshot(snap, indices),
                        pending_reads,
                    },
                );
                HttpResponse::new(200, r#"{"accepted": true}"#)
            }
            (Method::Delete, [repo, snap]) => {
                match self.snapshots.get_mut(*repo).and_then(|s| s.remove(*snap)) {
                    Some(_) => acknowledged(),
                    None => missing(snap),
                }
            }
            _ => HttpResponse::new(400, r#"{"error": "bad request"}"#),
        }
    }
}

fn acknowledged() -> HttpResponse {
    HttpResponse::new(200, r#"{"acknowledged": true}"#)
}

fn missing(name: &str) -> HttpResponse {
    HttpResponse::new(404, json!({ "error": format!("[{}] missing", name) }).to_string())
}

fn completed_snapshot(name: &str, indices: &str) -> Value {
    let indices: Vec<&str> = if indices == "_all" {
        Vec::new()
    } else {
        indices.split(',').collect()
    };
    json!({
        "snapshot": name,
        "indices": indices,
        "state": "SUCCESS",
        "start_time": "2024-01-10T02:00:00.000Z",
        "end_time": "2024-01-10T02:00:01.500Z",
        "duration_in_millis": 1500,
        "failures": [],
        "shards": {"total": 5, "failed": 0, "successful": 5}
    })
}

fn in_progress(info: &Value) -> Value {
    let mut info = info.clone();
    if let Some(obj) = info.as_object_mut() {
        obj.insert("state".into(), json!("IN_PROGRESS"));
        obj.remove("end_time");
        obj.remove("duration_in_millis");
    }
    info
}

impl Transport for FakeSnapshotService {
    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(TransportError("connection refused".into()));
        }

        let path = url
            .strip_prefix(FAKE_BASE_URL)
            .and_then(|rest| rest.strip_prefix("/_snapshot/"))
            .unwrap_or(url)
            .to_string();

        state.requests.push((method, path.clone()));
        if let Some(body) = body {
            state.bodies.push(body.clone());
        }

        if let Some((status, body)) = state.overrides.get(&(method, path.clone())) {
            return Ok(HttpResponse::new(*status, body.clone()));
        }

        Ok(state.handle(method, &path, body))
    }
}
