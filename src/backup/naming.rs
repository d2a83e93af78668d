//! Dated repository and snapshot names
//!
//! Backup repositories are named `<prefix>_<YYYYMMDD>`. The date suffix is
//! the only ordering and aging key. Scheduled snapshots are named
//! `<YYYYMMDD_HH:MM:SS>` in local time.

use chrono::{Local, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{BackupError, BackupResult};

/// Format of the date suffix of backup repositories
pub const REPOSITORY_DATE_FORMAT: &str = "%Y%m%d";

/// Format of scheduled snapshot names
pub const SNAPSHOT_NAME_FORMAT: &str = "%Y%m%d_%H:%M:%S";

/// Source of the current local time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Midnight of the given date
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Regex matching `<prefix>_<8 digits>` exactly
pub fn backup_pattern(prefix: &str) -> BackupResult<Regex> {
    if prefix.is_empty() {
        return Err(BackupError::Validation("Backup prefix cannot be empty".into()));
    }
    Regex::new(&format!(r"^{}_\d{{8}}$", regex::escape(prefix)))
        .map_err(|e| BackupError::Validation(format!("Invalid backup prefix '{}': {}", prefix, e)))
}

/// Parse the date suffix of a backup repository name.
///
/// Returns `None` when the name has no 8-digit suffix or the digits are not
/// a calendar date.
pub fn repository_date(name: &str) -> Option<NaiveDate> {
    let (_, suffix) = name.rsplit_once('_')?;
    if suffix.len() != 8 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = suffix[0..4].parse().ok()?;
    let month: u32 = suffix[4..6].parse().ok()?;
    let day: u32 = suffix[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `<prefix>_<YYYYMMDD>`
pub fn repository_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}", prefix, date.format(REPOSITORY_DATE_FORMAT))
}

/// Directory name of a dated repository below the backup base path
pub fn repository_dir_name(date: NaiveDate) -> String {
    date.format(REPOSITORY_DATE_FORMAT).to_string()
}

/// `<YYYYMMDD_HH:MM:SS>`
pub fn snapshot_name(now: NaiveDateTime) -> String {
    now.format(SNAPSHOT_NAME_FORMAT).to_string()
}

/// Whole days between `date` and `today`; negative for future dates
pub fn age_in_days(today: NaiveDate, date: NaiveDate) -> i64 {
    today.signed_duration_since(date).num_days()
}
