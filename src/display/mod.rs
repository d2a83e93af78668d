//! Display formatting for terminal output
//!
//! Provides utilities for formatting repositories and snapshots as tables
//! and detail views.

pub mod repository;
pub mod snapshot;

pub use repository::{format_repository_details, format_repository_list};
pub use snapshot::{format_snapshot_details, format_snapshot_list};
