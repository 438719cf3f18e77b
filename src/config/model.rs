//! Config struct definition and default implementation.

use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Configuration for a coordinator.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Seconds to wait for the directory lock (0 = a single attempt).
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    /// File name of the lock inside the shared directory.
    #[serde(default = "default_lock_file_name")]
    pub lock_file_name: String,

    /// Minutes after which a held lock may be broken by a waiter.
    ///
    /// `None` disables stale lock breaking entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_stale_minutes: Option<u32>,

    /// Cap on the exponential backoff between lock attempts.
    #[serde(default = "default_lock_poll_max_ms")]
    pub lock_poll_max_ms: u64,

    // =========================================================================
    // Event log
    // =========================================================================
    /// NDJSON event log, relative to the shared directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_timeout_secs: default_lock_timeout_secs(),
            lock_file_name: default_lock_file_name(),
            lock_stale_minutes: None,
            lock_poll_max_ms: default_lock_poll_max_ms(),
            event_log: None,
        }
    }
}
