//! Directory lock for dirclaim.
//!
//! One lock file per shared directory serializes every claim and status
//! update in that directory, across processes and hosts.
//!
//! # Lock File
//!
//! The lock is held while the lock file exists. It is created with
//! **create_new** semantics (`O_CREAT | O_EXCL`), which is atomic on local
//! filesystems and on NFSv3 and later. `flock`/`fcntl` locks are not used:
//! over network filesystems they are either unsupported or silently local.
//! Every acquisition attempt is a real create call against the server, so no
//! decision is made from a cached `stat`.
//!
//! # Lock Metadata
//!
//! The holder writes JSON metadata into the lock file:
//! - `owner`: `user@HOST`
//! - `host`, `pid`: the holding process
//! - `created_at`: RFC3339 timestamp
//! - `action`: what the holder is doing (`claim` or `update`)
//!
//! # Stale Locks
//!
//! A holder that crashes leaves its lock file behind. When a stale threshold
//! is configured, waiters break locks older than the threshold (see `stale`).
//! Without one, an operator must clear the lock with [`clear_lock`].
//!
//! # RAII Guards
//!
//! [`LockGuard`] removes the lock file when dropped. If removal fails during
//! drop, a warning is printed but the program does not crash.

mod acquire;
mod guard;
mod metadata;
mod operations;
mod stale;
mod types;


pub use acquire::{LockOptions, acquire_lock};
pub use guard::LockGuard;
pub use metadata::{LockMetadata, format_age};
pub use operations::{clear_lock, inspect_lock};
pub use types::LockInfo;
