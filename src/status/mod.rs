//! Status records and their on-disk store.
//!
//! Each (item, task) pair owns at most one file, `<item>.<task>.status`, in
//! the shared directory. Its existence is the claim marker; its single line
//! says who claimed it and what they last reported.

mod record;
mod store;

#[cfg(test)]
mod tests;

pub use record::{DELIMITER, StatusRecord, TIMESTAMP_FORMAT, sanitize_message};
pub use store::{STATUS_EXTENSION, StatusEntry, StatusStore, validate_identifier, validate_pair};
