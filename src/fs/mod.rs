//! Filesystem utilities for dirclaim.
//!
//! Status files are shared between processes that read them without holding
//! the directory lock, so every write here is all-or-nothing.

pub mod atomic;

pub use atomic::{atomic_create, atomic_write};
