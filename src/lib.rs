//! es-backup - Elasticsearch snapshot and backup management
//!
//! This library provides the core functionality for the es-backup command
//! line tool. It manages snapshot repositories and snapshots through the
//! cluster's `_snapshot` API and keeps a rolling set of dated full backups.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings file and path resolution
//! - `error`: Custom error types
//! - `client`: HTTP transport and typed `_snapshot` calls
//! - `models`: Repositories, snapshots and their options
//! - `services`: Repository registry and snapshot management
//! - `backup`: Dated full backups and retention
//! - `display`: Terminal tables and detail views
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use es_backup::client::SnapshotApi;
//! use es_backup::config::{ConfigPaths, Settings};
//!
//! let paths = ConfigPaths::new()?;
//! let settings = Settings::load_or_default(&paths)?;
//! let api = SnapshotApi::from_settings(&settings)?;
//! ```

pub mod backup;
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;

pub use error::BackupError;
