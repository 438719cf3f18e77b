//! Event logging for dirclaim.
//!
//! Coordinators can append one JSON object per line (NDJSON) to an event log
//! describing every claim and status update they perform. Status files only
//! keep the latest message; the event log keeps the history.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (`claim`, `update`, `lock_broken`, ...)
//! - `actor`: `user@HOST`
//! - `pid`: process id of the actor
//! - `item`, `task`: the pair concerned, when there is one
//! - `details`: freeform object with action-specific information
//!
//! # Usage
//!
//! Events are appended while the directory lock is held, so lines from
//! different hosts never interleave within the file.
//!
//! ```no_run
//! use dirclaim::events::{Event, EventAction, append_event};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let event = Event::new(EventAction::Claim)
//!     .with_pair("report", "ocr")
//!     .with_details(json!({"message": "queued"}));
//! append_event(Path::new("/shared/queue/events.ndjson"), &event)?;
//! # Ok::<(), dirclaim::error::ClaimError>(())
//! ```

use crate::error::{ClaimError, Result};
use crate::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Pair claimed (Unclaimed -> Claimed)
    Claim,
    /// Claim refused because the pair was already claimed
    ClaimDeclined,
    /// Status record overwritten
    Update,
    /// Update refused because the pair was never claimed
    UpdateRejected,
    /// Stale lock broken by a waiter
    LockBroken,
    /// Lock cleared manually
    LockCleared,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Claim => write!(f, "claim"),
            EventAction::ClaimDeclined => write!(f, "claim_declined"),
            EventAction::Update => write!(f, "update"),
            EventAction::UpdateRejected => write!(f, "update_rejected"),
            EventAction::LockBroken => write!(f, "lock_broken"),
            EventAction::LockCleared => write!(f, "lock_cleared"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Process id of the actor.
    pub pid: u32,

    /// Item identifier for pair-specific events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    /// Task identifier for pair-specific events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event for the current process, timestamped now.
    pub fn new(action: EventAction) -> Self {
        let identity = Identity::current();
        Self {
            ts: Utc::now(),
            action,
            actor: identity.owner_string(),
            pid: identity.pid,
            item: None,
            task: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the (item, task) pair for this event.
    pub fn with_pair(mut self, item: impl Into<String>, task: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self.task = Some(task.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ClaimError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Append an event to the event log, creating the file if needed.
///
/// # Returns
///
/// * `Ok(())` - Event was appended and synced
/// * `Err(ClaimError::UserError)` - Serialization or write failed
pub fn append_event(log_path: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            ClaimError::UserError(format!(
                "failed to open event log '{}': {}",
                log_path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        ClaimError::UserError(format!(
            "failed to write event to '{}': {}",
            log_path.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        ClaimError::UserError(format!(
            "failed to sync event log '{}': {}",
            log_path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event from the log. Blank lines are skipped.
pub fn read_events(log_path: &Path) -> Result<Vec<Event>> {
    let content = std::fs::read_to_string(log_path).map_err(|e| {
        ClaimError::UserError(format!(
            "failed to read event log '{}': {}",
            log_path.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                ClaimError::UserError(format!(
                    "failed to parse event {} in '{}': {}",
                    i + 1,
                    log_path.display(),
                    e
                ))
            })
        })
        .collect()
}
