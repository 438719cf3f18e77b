//! RAII lock guard implementation.

use super::metadata::LockMetadata;
use super::types::LockInfo;
use crate::error::{ClaimError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// RAII guard for the directory lock.
///
/// When dropped, the lock file is deleted, provided it still carries this
/// holder's metadata. If deletion fails, a warning is printed but no panic
/// occurs.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock file.
    path: PathBuf,

    /// Metadata written when the lock was taken.
    metadata: LockMetadata,

    /// Stale lock broken on the way to acquiring this one.
    broken: Option<LockInfo>,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(path: PathBuf, metadata: LockMetadata, broken: Option<LockInfo>) -> Self {
        Self {
            path,
            metadata,
            broken,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata this holder wrote into the lock file.
    pub fn metadata(&self) -> &LockMetadata {
        &self.metadata
    }

    /// The stale lock that had to be broken before this one was acquired.
    pub fn broken_lock(&self) -> Option<&LockInfo> {
        self.broken.as_ref()
    }

    /// Manually release the lock and report failures.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.remove_if_owned()
    }

    /// Remove the lock file unless another holder has taken it over.
    ///
    /// A lock broken as stale may since have been re-acquired by someone
    /// else; that lock must not be removed.
    fn remove_if_owned(&self) -> Result<()> {
        let on_disk = LockMetadata::from_file(&self.path).map_err(|e| {
            ClaimError::LockError(format!(
                "lock '{}' is no longer ours ({})",
                self.path.display(),
                e
            ))
        })?;

        if on_disk != self.metadata {
            return Err(ClaimError::LockError(format!(
                "lock '{}' was broken and is now held by {} (pid {})",
                self.path.display(),
                on_disk.owner,
                on_disk
                    .pid
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string())
            )));
        }

        fs::remove_file(&self.path).map_err(|e| {
            ClaimError::LockError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.remove_if_owned()
        {
            eprintln!("Warning: {}", e);
        }
    }
}
