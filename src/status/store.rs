//! File naming and read/write primitives for status files.

use super::record::{DELIMITER, StatusRecord};
use crate::error::{ClaimError, Result};
use crate::fs::{atomic_create, atomic_write};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extension of status files, without the leading dot.
pub const STATUS_EXTENSION: &str = "status";

/// One status file found by [`StatusStore::list`].
#[derive(Debug, Clone)]
pub struct StatusEntry {
    /// Path of the status file.
    pub path: PathBuf,
    /// Item identifier taken from the file name.
    pub item: String,
    /// Task identifier taken from the file name.
    pub task: String,
    /// The parsed record, or why it could not be parsed.
    ///
    /// A marker that does not parse is still a claim.
    pub record: std::result::Result<StatusRecord, String>,
}

/// Status files of one shared directory.
#[derive(Debug, Clone)]
pub struct StatusStore {
    dir: PathBuf,
}

impl StatusStore {
    /// Store rooted at `dir`. The directory is not checked here.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The shared directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<item>.<task>.status`
    pub fn path_for(&self, item: &str, task: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}", item, task, STATUS_EXTENSION))
    }

    /// Whether the status file for the pair exists.
    ///
    /// Uses `open()` rather than `stat()`: NFS clients revalidate on open, but
    /// may answer `stat()` from a stale attribute or negative-lookup cache.
    pub fn exists(&self, item: &str, task: &str) -> Result<bool> {
        let path = self.path_for(item, task);
        match File::open(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ClaimError::UserError(format!(
                "failed to check status file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    /// Create the status file for the record's pair if it does not exist.
    ///
    /// Returns `false`, leaving the existing file untouched, if it does.
    pub fn create(&self, record: &StatusRecord) -> Result<bool> {
        atomic_create(
            self.path_for(&record.item, &record.task),
            record.encode().as_bytes(),
        )
    }

    /// Replace the status file for the record's pair with the record.
    pub fn overwrite(&self, record: &StatusRecord) -> Result<()> {
        atomic_write(
            self.path_for(&record.item, &record.task),
            record.encode().as_bytes(),
        )
    }

    /// Read and parse the status file for the pair.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The pair is claimed and the record parses
    /// * `Ok(None)` - The pair is not claimed
    /// * `Err(ClaimError::MalformedRecord)` - The pair is claimed but the record is unreadable
    pub fn read(&self, item: &str, task: &str) -> Result<Option<StatusRecord>> {
        let path = self.path_for(item, task);
        match fs::read_to_string(&path) {
            Ok(content) => match StatusRecord::parse(&content) {
                Ok(record) => Ok(Some(record)),
                Err(ClaimError::MalformedRecord(why)) => Err(ClaimError::MalformedRecord(
                    format!("'{}': {}", path.display(), why),
                )),
                Err(e) => Err(e),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClaimError::UserError(format!(
                "failed to read status file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    /// Every status file in the directory, sorted by item then task.
    pub fn list(&self) -> Result<Vec<StatusEntry>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            ClaimError::UserError(format!(
                "failed to read directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut statuses = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ClaimError::UserError(format!("failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            let Some((item, task)) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_status_file_name)
            else {
                continue;
            };

            // Vanished between read_dir and read: a listing is a snapshot anyway.
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ClaimError::UserError(format!(
                        "failed to read status file '{}': {}",
                        path.display(),
                        e
                    )));
                }
            };

            statuses.push(StatusEntry {
                path,
                item,
                task,
                record: StatusRecord::parse(&content).map_err(|e| e.to_string()),
            });
        }

        statuses.sort_by(|a, b| (&a.item, &a.task).cmp(&(&b.item, &b.task)));
        Ok(statuses)
    }
}

/// Split `<item>.<task>.status` into item and task.
///
/// The task is the last dot-separated token, so items may contain dots.
fn parse_status_file_name(name: &str) -> Option<(String, String)> {
    if name.starts_with('.') {
        return None;
    }
    let stem = name.strip_suffix(STATUS_EXTENSION)?.strip_suffix('.')?;
    let (item, task) = stem.rsplit_once('.')?;
    if item.is_empty() || task.is_empty() {
        return None;
    }
    Some((item.to_string(), task.to_string()))
}

/// Check an (item, task) pair before it is turned into a status file name.
///
/// Both identifiers must pass [`validate_identifier`]. The task must also be
/// free of dots: the file name is split on its last `.`, so a dotted task
/// would let two different pairs share one status file.
pub fn validate_pair(item: &str, task: &str) -> Result<()> {
    validate_identifier("item", item)?;
    validate_identifier("task", task)?;

    if task.contains('.') {
        return Err(ClaimError::InvalidIdentifier(format!(
            "task identifier '{}' must not contain '.'",
            task.escape_debug()
        )));
    }

    Ok(())
}

/// Check that an identifier can be embedded in a status file name and record.
///
/// # Arguments
///
/// * `kind` - What the identifier is (`item` or `task`), for the error message
/// * `value` - The identifier
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClaimError::InvalidIdentifier(format!(
            "{} identifier must not be empty",
            kind
        )));
    }

    if value == "." || value == ".." {
        return Err(ClaimError::InvalidIdentifier(format!(
            "{} identifier must not be '{}'",
            kind, value
        )));
    }

    if let Some(bad) = value
        .chars()
        .find(|&c| matches!(c, '/' | '\\' | '\0' | '\n' | '\r') || c == DELIMITER)
    {
        return Err(ClaimError::InvalidIdentifier(format!(
            "{} identifier '{}' contains forbidden character {:?}",
            kind,
            value.escape_debug(),
            bad
        )));
    }

    Ok(())
}
