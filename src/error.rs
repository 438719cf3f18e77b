//! Error types for dirclaim.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Negative protocol results ("already claimed", "not claimed") are ordinary
//! return values and never appear here.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dirclaim operations.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// The shared directory does not exist or is not a directory.
    #[error("shared directory '{0}' does not exist")]
    DirectoryMissing(String),

    /// The directory lock could not be obtained within the configured timeout.
    ///
    /// No state was mutated when this is returned.
    #[error("timed out after {waited_secs}s waiting for lock '{}'{holder}", .path.display())]
    LockTimeout {
        /// Path of the contended lock file.
        path: PathBuf,
        /// How long the caller waited.
        waited_secs: u64,
        /// Description of the current holder (empty when unknown).
        holder: String,
    },

    /// The lock file could not be created, written or removed.
    #[error("Lock operation failed: {0}")]
    LockError(String),

    /// An item, task or path argument cannot be used as an identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A status record does not have the documented six-field layout.
    #[error("malformed status record: {0}")]
    MalformedRecord(String),

    /// Configuration problems and other failures with a user-facing message.
    #[error("{0}")]
    UserError(String),
}

impl ClaimError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClaimError::DirectoryMissing(_) => exit_codes::DIRECTORY_MISSING,
            ClaimError::LockTimeout { .. } => exit_codes::LOCK_FAILURE,
            ClaimError::LockError(_) => exit_codes::LOCK_FAILURE,
            ClaimError::InvalidIdentifier(_) => exit_codes::USER_ERROR,
            ClaimError::MalformedRecord(_) => exit_codes::USER_ERROR,
            ClaimError::UserError(_) => exit_codes::USER_ERROR,
        }
    }

    /// Whether this is the fatal lock timeout condition.
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, ClaimError::LockTimeout { .. })
    }
}

/// Result type alias for dirclaim operations.
pub type Result<T> = std::result::Result<T, ClaimError>;
