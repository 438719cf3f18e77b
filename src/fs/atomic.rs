//! Atomic filesystem operations for dirclaim.
//!
//! Both primitives stage the full content in a temporary file in the target's
//! directory, sync it, and only then make it visible under the target name:
//!
//! - [`atomic_write`] replaces the target with `rename()`, so a reader sees
//!   either the previous content or the new content, never a truncated file.
//! - [`atomic_create`] publishes the target with `link()`, which fails if the
//!   name already exists. This is create-if-absent as a single call. When
//!   `link()` reports an error, the temporary file's link count decides
//!   whether the link was made anyway, as a retried NFS request can report
//!   `EEXIST` for its own earlier success.
//!
//! # Important Notes
//!
//! - The temporary file is named `.{filename}.{host}.{pid}.{seq}.tmp` so no
//!   two writers, on any host or thread, ever share one
//! - On crash, a temporary file may remain in the directory
//! - Filesystems without hard links fall back to an exclusive create followed
//!   by a write, which is still create-if-absent but not all-or-nothing

use crate::error::{ClaimError, Result};
use crate::identity::host_name;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Atomically replace the content of a file.
///
/// # Returns
///
/// * `Ok(())` - On successful atomic write
/// * `Err(ClaimError::UserError)` - On write or rename failure
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ClaimError::UserError(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    sync_parent(path);
    Ok(())
}

/// Atomically create a file with the given content, unless it already exists.
///
/// # Returns
///
/// * `Ok(true)` - The file did not exist and now holds `content`
/// * `Ok(false)` - The file already existed; it was not touched
/// * `Err(ClaimError::UserError)` - On write failure
pub fn atomic_create<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<bool> {
    let path = path.as_ref();

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    settle_link(linked, &temp_path, path, content)
}

/// Decide the outcome of the `link()` that published `temp_path` as `path`.
///
/// A failed `link()` is not proof that the name was taken by someone else:
/// over NFS a retransmitted request can report `EEXIST` for a link the server
/// already made. The temporary file's link count says whether it landed.
fn settle_link(
    linked: io::Result<()>,
    temp_path: &Path,
    path: &Path,
    content: &[u8],
) -> Result<bool> {
    let created = match linked {
        Ok(()) => true,
        Err(_) if link_landed(temp_path) => true,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => false,
        Err(_) => {
            let _ = fs::remove_file(temp_path);
            return create_exclusive(path, content);
        }
    };

    let _ = fs::remove_file(temp_path);
    if created {
        sync_parent(path);
    }
    Ok(created)
}

/// Whether the temporary file gained a second name.
#[cfg(unix)]
fn link_landed(temp_path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(temp_path)
        .map(|m| m.nlink() >= 2)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn link_landed(_temp_path: &Path) -> bool {
    false
}

/// Create-if-absent without hard links.
fn create_exclusive(path: &Path, content: &[u8]) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ClaimError::UserError(format!(
                "failed to create '{}': {}",
                path.display(),
                e
            )));
        }
    };

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            ClaimError::UserError(format!("failed to write '{}': {}", path.display(), e))
        })?;

    sync_parent(path);
    Ok(true)
}

/// Generate a temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        ClaimError::UserError(format!("invalid file path '{}'", target.display()))
    })?;

    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(
        ".{}.{}.{}.{}.tmp",
        filename,
        host_name(),
        std::process::id(),
        seq
    );
    Ok(parent.join(temp_name))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        ClaimError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        ClaimError::UserError(format!("failed to write to temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        ClaimError::UserError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}

/// Persist the directory entry. Best-effort; unsupported on some platforms.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use tempfile::TempDir;

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");

        atomic_write(&file_path, b"hello world").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "hello world");
    }

    #[test]
    fn test_atomic_write_replaces_whole_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");

        fs::write(&file_path, "a much longer original line that must vanish").unwrap();
        atomic_write(&file_path, b"short").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "short");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_write_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("missing").join("a.b.status");

        assert!(atomic_write(&file_path, b"x").is_err());
    }

    #[test]
    fn test_atomic_create_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");

        assert!(atomic_create(&file_path, b"first").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "first");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_atomic_create_leaves_existing_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");

        fs::write(&file_path, "").unwrap();

        assert!(!atomic_create(&file_path, b"second").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_create_exclusive_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");

        assert!(create_exclusive(&file_path, b"one").unwrap());
        assert!(!create_exclusive(&file_path, b"two").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "one");
    }

    #[cfg(unix)]
    #[test]
    fn test_link_landed_follows_link_count() {
        let temp_dir = TempDir::new().unwrap();
        let staged = temp_dir.path().join(".a.b.status.tmp");
        fs::write(&staged, "x").unwrap();

        assert!(!link_landed(&staged));
        fs::hard_link(&staged, temp_dir.path().join("a.b.status")).unwrap();
        assert!(link_landed(&staged));
        assert!(!link_landed(&temp_dir.path().join("missing.tmp")));
    }

    #[cfg(unix)]
    #[test]
    fn test_eexist_after_own_link_counts_as_created() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");
        let staged = generate_temp_path(&file_path).unwrap();
        write_and_sync(&staged, b"mine").unwrap();

        // The link is made, but the reply the caller sees is EEXIST.
        fs::hard_link(&staged, &file_path).unwrap();
        let reply = Err(io::Error::from(ErrorKind::AlreadyExists));

        assert!(settle_link(reply, &staged, &file_path, b"mine").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "mine");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_eexist_from_other_claimant_is_declined() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.b.status");
        fs::write(&file_path, "theirs").unwrap();

        let staged = generate_temp_path(&file_path).unwrap();
        write_and_sync(&staged, b"mine").unwrap();
        let linked = fs::hard_link(&staged, &file_path);

        assert!(!settle_link(linked, &staged, &file_path, b"mine").unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "theirs");
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_generate_temp_path_is_hidden_sibling() {
        let target = Path::new("/shared/queue/report.ocr.status");
        let temp = generate_temp_path(target).unwrap();

        assert_eq!(temp.parent().unwrap(), Path::new("/shared/queue"));
        let name = temp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".report.ocr.status."));
        assert!(name.contains(&format!(".{}.", std::process::id())));
        assert!(name.ends_with(".tmp"));

        let other = generate_temp_path(target).unwrap();
        assert_ne!(temp, other);
    }

    #[test]
    fn test_atomic_create_single_winner_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = Arc::new(temp_dir.path().join("race.task.status"));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = Arc::clone(&file_path);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    atomic_create(path.as_ref(), format!("writer {}", i).as_bytes()).unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();

        assert_eq!(winners, 1);
        assert!(leftover_temp_files(temp_dir.path()).is_empty());
        assert!(
            fs::read_to_string(file_path.as_ref())
                .unwrap()
                .starts_with("writer ")
        );
    }
}
