//! Lock acquisition with retry and timeout.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use super::operations::inspect_lock;
use super::stale::break_if_stale;
use crate::error::{ClaimError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(10);

/// How to wait for the lock.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Give up after this long. Zero means a single attempt.
    pub timeout: Duration,

    /// Cap on the exponential backoff between attempts.
    pub poll_max: Duration,

    /// Break locks older than this many minutes; `None` never breaks.
    pub stale_minutes: Option<u32>,

    /// Action recorded in the lock metadata.
    pub action: String,
}

impl LockOptions {
    /// Options with the given timeout and defaults for everything else.
    pub fn new(action: &str, timeout: Duration) -> Self {
        Self {
            timeout,
            poll_max: Duration::from_millis(crate::config::DEFAULT_LOCK_POLL_MAX_MS),
            stale_minutes: None,
            action: action.to_string(),
        }
    }
}

enum Attempt {
    Acquired(LockMetadata),
    Held,
}

/// Acquire the lock, retrying with exponential backoff until `options.timeout`.
///
/// # Returns
///
/// * `Ok(LockGuard)` - Successfully acquired lock with RAII guard
/// * `Err(ClaimError::LockTimeout)` - Lock still held when the timeout expired
/// * `Err(ClaimError::LockError)` - The lock file could not be created or written
pub fn acquire_lock(lock_path: &Path, options: &LockOptions) -> Result<LockGuard> {
    let start = Instant::now();
    let mut retry_delay = INITIAL_RETRY_DELAY;
    let mut broken = None;

    loop {
        match try_acquire(lock_path, &options.action)? {
            Attempt::Acquired(metadata) => {
                return Ok(LockGuard::new(lock_path.to_path_buf(), metadata, broken));
            }
            Attempt::Held => {
                if let Some(stale_minutes) = options.stale_minutes
                    && let Some(info) = break_if_stale(lock_path, stale_minutes)?
                {
                    eprintln!("Warning: broke stale lock {}", info);
                    broken = Some(info);
                    continue;
                }

                let elapsed = start.elapsed();
                if elapsed >= options.timeout {
                    return Err(timeout_error(lock_path, elapsed, options.stale_minutes));
                }

                thread::sleep(retry_delay.min(options.timeout - elapsed));
                retry_delay = (retry_delay * 2).min(options.poll_max);
            }
        }
    }
}

/// Single exclusive-create attempt.
fn try_acquire(lock_path: &Path, action: &str) -> Result<Attempt> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(Attempt::Held),
        Err(e) => {
            return Err(ClaimError::LockError(format!(
                "failed to acquire lock '{}': {}",
                lock_path.display(),
                e
            )));
        }
    };

    let metadata = LockMetadata::new(action);
    let json = metadata.to_json().inspect_err(|_| {
        let _ = fs::remove_file(lock_path);
    })?;

    file.write_all(json.as_bytes()).map_err(|e| {
        let _ = fs::remove_file(lock_path);
        ClaimError::LockError(format!("failed to write lock metadata: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(lock_path);
        ClaimError::LockError(format!("failed to sync lock file: {}", e))
    })?;

    Ok(Attempt::Acquired(metadata))
}

fn timeout_error(lock_path: &Path, waited: Duration, stale_minutes: Option<u32>) -> ClaimError {
    let holder = match inspect_lock(lock_path, stale_minutes) {
        Ok(Some(info)) => format!(" ({})", info.holder_summary()),
        _ => String::new(),
    };

    ClaimError::LockTimeout {
        path: lock_path.to_path_buf(),
        waited_secs: waited.as_secs(),
        holder,
    }
}
