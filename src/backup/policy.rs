//! Retention policy for scheduled backups

use crate::error::{BackupError, BackupResult};

/// How many full backups to keep and how long each one is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Number of full backups (dated repositories) to retain
    pub full_backup_count: u32,
    /// Days before a new full backup is started
    pub full_backup_life: u32,
}

impl RetentionPolicy {
    /// Create a policy; both values must be at least 1
    pub fn new(full_backup_count: u32, full_backup_life: u32) -> BackupResult<Self> {
        if full_backup_count == 0 {
            return Err(BackupError::Validation(
                "Full backup count must be at least 1".into(),
            ));
        }
        if full_backup_life == 0 {
            return Err(BackupError::Validation(
                "Full backup life must be at least 1 day".into(),
            ));
        }
        Ok(Self {
            full_backup_count,
            full_backup_life,
        })
    }

    /// Age in days beyond which a full backup is deleted
    pub fn max_age_days(&self) -> i64 {
        i64::from(self.full_backup_count) * i64::from(self.full_backup_life)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_age() {
        assert_eq!(RetentionPolicy::new(1, 7).unwrap().max_age_days(), 7);
        assert_eq!(RetentionPolicy::new(2, 7).unwrap().max_age_days(), 14);
        assert_eq!(RetentionPolicy::new(4, 7).unwrap().max_age_days(), 28);
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(RetentionPolicy::new(0, 7).is_err());
        assert!(RetentionPolicy::new(4, 0).is_err());
    }
}
