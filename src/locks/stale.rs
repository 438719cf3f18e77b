//! Breaking locks left behind by crashed holders.
//!
//! Two waiters may decide at the same moment that a lock is stale. If both
//! simply removed it, the second removal could delete a fresh lock the first
//! waiter had just taken. Breaking is therefore serialized through a second
//! file, `<lock>.break`, created with exclusive-create. Holding it, a breaker
//! re-reads the lock and removes it only if it is still the same stale lock
//! it observed.
//!
//! The marker only orders breakers against each other. A holder that is slow
//! but alive can still release its own lock between the re-read and the
//! removal, and a fresh holder can take the name in that gap, in which case
//! the breaker removes the fresh lock. The window is a single `stat` wide and
//! needs a holder older than `stale_minutes`. Keep `stale_minutes` well above
//! the longest critical section.

use super::metadata::LockMetadata;
use super::operations::{inspect_lock, mtime_age};
use super::types::LockInfo;
use crate::error::{ClaimError, Result};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Break the lock if it is older than `stale_minutes`.
///
/// # Returns
///
/// * `Ok(Some(LockInfo))` - The stale lock that was removed
/// * `Ok(None)` - The lock is fresh, already gone, or another waiter is breaking it
pub(super) fn break_if_stale(lock_path: &Path, stale_minutes: u32) -> Result<Option<LockInfo>> {
    let observed = match inspect_lock(lock_path, Some(stale_minutes))? {
        Some(info) if info.is_stale => info,
        _ => return Ok(None),
    };

    let break_path = break_path(lock_path);
    let mut marker = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&break_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            clear_abandoned_marker(&break_path, stale_minutes);
            return Ok(None);
        }
        Err(e) => {
            return Err(ClaimError::LockError(format!(
                "failed to create '{}': {}",
                break_path.display(),
                e
            )));
        }
    };

    if let Ok(json) = LockMetadata::new("break").to_json() {
        let _ = marker.write_all(json.as_bytes());
    }
    drop(marker);

    let result = remove_if_unchanged(lock_path, &observed, stale_minutes);

    if let Err(e) = fs::remove_file(&break_path) {
        eprintln!(
            "Warning: failed to remove '{}': {}",
            break_path.display(),
            e
        );
    }

    result
}

fn remove_if_unchanged(
    lock_path: &Path,
    observed: &LockInfo,
    stale_minutes: u32,
) -> Result<Option<LockInfo>> {
    let current = match inspect_lock(lock_path, Some(stale_minutes))? {
        Some(info) => info,
        None => return Ok(None),
    };

    if !current.is_stale || current.metadata != observed.metadata {
        return Ok(None);
    }

    match fs::remove_file(lock_path) {
        Ok(()) => Ok(Some(current)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ClaimError::LockError(format!(
            "failed to break stale lock '{}': {}",
            lock_path.display(),
            e
        ))),
    }
}

/// A breaker that crashed mid-break leaves its marker; expire it the same way.
fn clear_abandoned_marker(break_path: &Path, stale_minutes: u32) {
    let modified = match fs::metadata(break_path) {
        Ok(m) => m.modified().ok(),
        Err(_) => return,
    };

    if mtime_age(modified).num_minutes() > stale_minutes as i64 {
        let _ = fs::remove_file(break_path);
    }
}

/// `<lock>.break` beside the lock file.
pub(super) fn break_path(lock_path: &Path) -> PathBuf {
    let mut name = lock_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("lockfile"));
    name.push(".break");
    lock_path.with_file_name(name)
}
