//! Lock inspection and clearing.

use super::metadata::LockMetadata;
use super::types::LockInfo;
use crate::error::{ClaimError, Result};
use chrono::Duration;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Inspect the lock file without touching it.
///
/// # Arguments
///
/// * `lock_path` - Path to the lock file
/// * `stale_minutes` - Stale threshold; `None` never reports a lock as stale
///
/// # Returns
///
/// * `Ok(Some(LockInfo))` - The lock is currently held
/// * `Ok(None)` - The lock is free
pub fn inspect_lock(lock_path: &Path, stale_minutes: Option<u32>) -> Result<Option<LockInfo>> {
    let file_meta = match fs::metadata(lock_path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ClaimError::LockError(format!(
                "failed to stat lock '{}': {}",
                lock_path.display(),
                e
            )));
        }
    };

    let metadata = LockMetadata::from_file(lock_path).ok();
    let age = match &metadata {
        Some(meta) => meta.age(),
        None => mtime_age(file_meta.modified().ok()),
    };
    let is_stale = stale_minutes.is_some_and(|m| age.num_minutes() > m as i64);

    Ok(Some(LockInfo {
        path: lock_path.to_path_buf(),
        metadata,
        age,
        is_stale,
    }))
}

/// Clear the lock file.
///
/// This removes the lock file unconditionally. The caller is responsible for
/// verifying that clearing the lock is appropriate (the holder has crashed,
/// or the operator passed `--force`).
///
/// # Returns
///
/// * `Ok(LockInfo)` - Information about the cleared lock (for audit purposes)
/// * `Err(ClaimError::UserError)` - The lock is not held
pub fn clear_lock(lock_path: &Path, stale_minutes: Option<u32>) -> Result<LockInfo> {
    let info = inspect_lock(lock_path, stale_minutes)?.ok_or_else(|| {
        ClaimError::UserError(format!("lock '{}' is not held", lock_path.display()))
    })?;

    fs::remove_file(lock_path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ClaimError::UserError(format!("lock '{}' is not held", lock_path.display()))
        } else {
            ClaimError::LockError(format!(
                "failed to clear lock '{}': {}",
                lock_path.display(),
                e
            ))
        }
    })?;

    Ok(info)
}

/// Age of a file from its modification time; zero if unknown or in the future.
pub(super) fn mtime_age(modified: Option<SystemTime>) -> Duration {
    modified
        .and_then(|m| SystemTime::now().duration_since(m).ok())
        .and_then(|d| Duration::from_std(d).ok())
        .unwrap_or_else(Duration::zero)
}
