//! Exit code constants for the dirclaim binary.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid identifier, config or I/O failure)
//! - 2: Declined (pair already claimed, or nothing claimed to update)
//! - 3: Lock failure (timed out or lock file I/O)
//! - 4: Shared directory missing

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid identifiers, config or I/O failure.
pub const USER_ERROR: i32 = 1;

/// The operation was declined: the pair is already claimed, or an update
/// found no claim to update.
pub const DECLINED: i32 = 2;

/// Lock acquisition failure: timed out, or the lock file could not be managed.
pub const LOCK_FAILURE: i32 = 3;

/// The shared directory does not exist.
pub const DIRECTORY_MISSING: i32 = 4;
