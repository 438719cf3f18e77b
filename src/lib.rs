//! dirclaim: exactly-once work claiming for cooperating processes that share
//! nothing but a directory.
//!
//! Processes, possibly on different hosts mounting the same network
//! directory, split a set of (item, task) pairs between them without a
//! database or broker. A pair belongs to whoever creates its status file
//! first; a directory lock makes that check-and-create atomic.
//!
//! ```no_run
//! use dirclaim::coordinator::{ClaimOutcome, Coordinator};
//! use dirclaim::identifier::extract_identifier;
//!
//! let coord = Coordinator::open("/shared/queue")?;
//!
//! if let Some(item) = extract_identifier("/data/run1/report.txt")
//!     && let ClaimOutcome::Claimed(session) = coord.claim(&item, "ocr", "started")?
//! {
//!     // ... do the work ...
//!     coord.update_status(&session, "done")?;
//! }
//! # Ok::<(), dirclaim::error::ClaimError>(())
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod identifier;
pub mod identity;
pub mod locks;
pub mod status;

pub use coordinator::{ClaimOutcome, ClaimSession, Coordinator};
pub use error::{ClaimError, Result};
