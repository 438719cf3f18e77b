//! Default values for config fields.

/// Seconds a caller waits for the directory lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 40;

/// Name of the lock file inside the shared directory.
pub const DEFAULT_LOCK_FILE_NAME: &str = "lockfile";

/// Upper bound on the backoff between lock attempts, in milliseconds.
pub const DEFAULT_LOCK_POLL_MAX_MS: u64 = 500;

// Default value functions for serde
pub(crate) fn default_lock_timeout_secs() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}
pub(crate) fn default_lock_file_name() -> String {
    DEFAULT_LOCK_FILE_NAME.to_string()
}
pub(crate) fn default_lock_poll_max_ms() -> u64 {
    DEFAULT_LOCK_POLL_MAX_MS
}
