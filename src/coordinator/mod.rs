//! Claiming work items and updating their status.
//!
//! A [`Coordinator`] is bound to one shared directory. Every claim and every
//! status update takes the directory lock, so for a given directory:
//!
//! - at most one process holds the lock at any instant
//! - for each (item, task), the status file goes from absent to present for
//!   exactly one caller
//! - every status file write is ordered with every other write and
//!   existence check
//!
//! Reading and listing status records does not take the lock. Writes replace
//! files atomically, so a reader always sees a complete record.

mod session;


pub use session::{ClaimOutcome, ClaimSession};

use crate::config::Config;
use crate::error::{ClaimError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::identity::Identity;
use crate::locks::{self, LockGuard, LockInfo, LockOptions};
use crate::status::{StatusEntry, StatusRecord, StatusStore, validate_pair};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Claims and status updates against one shared directory.
#[derive(Debug, Clone)]
pub struct Coordinator {
    dir: PathBuf,
    lock_path: PathBuf,
    store: StatusStore,
    config: Config,
    identity: Identity,
}

impl Coordinator {
    /// Coordinator for `dir` with the default config (40 second lock timeout).
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - The directory exists
    /// * `Err(ClaimError::DirectoryMissing)` - It does not
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::with_config(dir, Config::default())
    }

    /// Coordinator for `dir` with the given lock timeout in seconds.
    pub fn with_timeout<P: AsRef<Path>>(dir: P, timeout_secs: u64) -> Result<Self> {
        Self::with_config(
            dir,
            Config {
                lock_timeout_secs: timeout_secs,
                ..Config::default()
            },
        )
    }

    /// Coordinator for `dir` with an explicit config.
    pub fn with_config<P: AsRef<Path>>(dir: P, config: Config) -> Result<Self> {
        let dir = dir.as_ref();
        config.validate()?;

        if !dir.is_dir() {
            return Err(ClaimError::DirectoryMissing(dir.display().to_string()));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            lock_path: dir.join(&config.lock_file_name),
            store: StatusStore::new(dir),
            config,
            identity: Identity::current(),
        })
    }

    /// The shared directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The lock file inside the shared directory.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// How long operations wait for the lock.
    pub fn timeout(&self) -> Duration {
        self.config.lock_timeout()
    }

    /// The config this coordinator was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Status file path for a pair.
    pub fn status_path(&self, item: &str, task: &str) -> PathBuf {
        self.store.path_for(item, task)
    }

    /// Claim (item, task) unless someone already has.
    ///
    /// Under the lock, the status file is created with a record carrying
    /// `message` if and only if it does not exist yet. An existing file is
    /// never inspected or modified, whatever its content.
    ///
    /// # Returns
    ///
    /// * `Ok(ClaimOutcome::Claimed(session))` - This caller owns the pair
    /// * `Ok(ClaimOutcome::AlreadyClaimed)` - The pair was claimed before
    /// * `Err(ClaimError::LockTimeout)` - Nothing was written
    /// * `Err(ClaimError::InvalidIdentifier)` - Rejected before locking
    pub fn claim(&self, item: &str, task: &str, message: &str) -> Result<ClaimOutcome> {
        validate_pair(item, task)?;

        let guard = self.lock("claim")?;

        let record = StatusRecord::new(
            &self.identity.host,
            self.identity.pid,
            item,
            task,
            message,
        );
        let created = self.store.create(&record)?;

        let outcome = if created {
            self.log(
                Event::new(EventAction::Claim)
                    .with_pair(item, task)
                    .with_details(json!({ "message": record.message })),
            );
            ClaimOutcome::Claimed(ClaimSession::new(item, task, self.identity.clone()))
        } else {
            self.log(Event::new(EventAction::ClaimDeclined).with_pair(item, task));
            ClaimOutcome::AlreadyClaimed
        };

        drop(guard);
        Ok(outcome)
    }

    /// Overwrite the status record of a claimed pair with a new message.
    ///
    /// The new record gets a fresh timestamp; host, pid, item and task come
    /// from the session. A missing status file is never created.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record was replaced
    /// * `Ok(false)` - No status file exists for the pair
    /// * `Err(ClaimError::LockTimeout)` - Nothing was written
    pub fn update_status(&self, session: &ClaimSession, message: &str) -> Result<bool> {
        let guard = self.lock("update")?;

        let (item, task) = (session.item(), session.task());
        let updated = if self.store.exists(item, task)? {
            let record = StatusRecord::new(session.host(), session.pid(), item, task, message);
            self.store.overwrite(&record)?;
            self.log(
                Event::new(EventAction::Update)
                    .with_pair(item, task)
                    .with_details(json!({ "message": record.message })),
            );
            true
        } else {
            self.log(Event::new(EventAction::UpdateRejected).with_pair(item, task));
            false
        };

        drop(guard);
        Ok(updated)
    }

    /// Current status record of a pair, without taking the lock.
    pub fn read_status(&self, item: &str, task: &str) -> Result<Option<StatusRecord>> {
        validate_pair(item, task)?;
        self.store.read(item, task)
    }

    /// Every status file in the directory, without taking the lock.
    pub fn list_status(&self) -> Result<Vec<StatusEntry>> {
        self.store.list()
    }

    /// Current lock holder, if any.
    pub fn inspect_lock(&self) -> Result<Option<LockInfo>> {
        locks::inspect_lock(&self.lock_path, self.config.lock_stale_minutes)
    }

    /// Remove the lock file regardless of who holds it.
    ///
    /// Only safe when the holder is known to be gone.
    pub fn clear_lock(&self) -> Result<LockInfo> {
        let cleared = locks::clear_lock(&self.lock_path, self.config.lock_stale_minutes)?;
        self.log(Event::new(EventAction::LockCleared).with_details(lock_details(&cleared)));
        Ok(cleared)
    }

    fn lock(&self, action: &str) -> Result<LockGuard> {
        let options = LockOptions {
            timeout: self.config.lock_timeout(),
            poll_max: self.config.lock_poll_max(),
            stale_minutes: self.config.lock_stale_minutes,
            action: action.to_string(),
        };

        let guard = locks::acquire_lock(&self.lock_path, &options)?;
        if let Some(broken) = guard.broken_lock() {
            self.log(Event::new(EventAction::LockBroken).with_details(lock_details(broken)));
        }
        Ok(guard)
    }

    /// Best-effort: a failing event log never fails the operation.
    fn log(&self, event: Event) {
        let Some(path) = self.config.event_log_path(&self.dir) else {
            return;
        };

        if let Err(e) = append_event(&path, &event) {
            eprintln!("Warning: failed to log {} event: {}", event.action, e);
        }
    }
}

fn lock_details(info: &LockInfo) -> serde_json::Value {
    match &info.metadata {
        Some(meta) => json!({
            "owner": meta.owner,
            "pid": meta.pid,
            "action": meta.action,
            "age_minutes": info.age.num_minutes(),
            "was_stale": info.is_stale,
        }),
        None => json!({
            "age_minutes": info.age.num_minutes(),
            "was_stale": info.is_stale,
        }),
    }
}
