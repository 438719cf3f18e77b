//! Configuration model for dirclaim.
//!
//! A `Config` tunes how a coordinator waits for and treats the directory lock.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for every field, and validation of config values.

mod defaults;
mod model;
mod operations;


pub use defaults::{DEFAULT_LOCK_FILE_NAME, DEFAULT_LOCK_POLL_MAX_MS, DEFAULT_LOCK_TIMEOUT_SECS};
pub use model::Config;
