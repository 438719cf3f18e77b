//! Lock information structures.

use super::metadata::{LockMetadata, format_age};
use chrono::Duration;
use std::path::PathBuf;

/// Information about a lock file found on disk.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The holder's metadata, if the lock file could be parsed.
    ///
    /// A holder that crashed between create and write leaves an empty file.
    pub metadata: Option<LockMetadata>,

    /// Age of the lock, from `created_at` or else the file's mtime.
    pub age: Duration,

    /// Whether the lock is older than the stale threshold.
    pub is_stale: bool,
}

impl LockInfo {
    /// Short description of the holder for error messages.
    pub fn holder_summary(&self) -> String {
        match &self.metadata {
            Some(meta) => format!(
                "held by {}, pid {}, action {}, age {}",
                meta.owner,
                meta.pid
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                meta.action,
                format_age(self.age)
            ),
            None => format!("unreadable holder, age {}", format_age(self.age)),
        }
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}{})",
            self.path.display(),
            self.holder_summary(),
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}
