//! CLI argument parsing for dirclaim.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dirclaim: exactly-once work claiming through a shared directory.
///
/// Cooperating processes, on one host or many, claim (item, task) pairs by
/// creating `<item>.<task>.status` files under a directory lock:
/// - A pair is claimed by whoever creates its status file first
/// - The status file's single line reports the claimant's latest progress
/// - Nothing but the shared directory is needed
#[derive(Parser, Debug)]
#[command(name = "dirclaim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Shared directory holding the lock and status files (must exist).
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    /// Seconds to wait for the directory lock (overrides the config file).
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// YAML config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for dirclaim.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Claim an (item, task) pair.
    ///
    /// Exits 0 if this call claimed the pair, 2 if it was already claimed.
    Claim(ClaimArgs),

    /// Replace the status message of a claimed pair.
    ///
    /// Exits 0 if the record was updated, 2 if the pair was never claimed.
    Update(UpdateArgs),

    /// List every status record in the directory.
    Status(StatusArgs),

    /// Show the status record of one pair.
    Show(ShowArgs),

    /// Lock management commands.
    ///
    /// Inspect or clear the directory lock.
    Lock(LockCommand),

    /// Print the work-item identifier derived from a file path.
    ///
    /// The last extension of the file name is removed. Exits 1 if the
    /// file name has no extension.
    Id(IdArgs),
}

/// Arguments for the `claim` command.
#[derive(Parser, Debug)]
pub struct ClaimArgs {
    /// Work item identifier.
    pub item: String,

    /// Task identifier (a simple alphanumeric token).
    pub task: String,

    /// Initial status message.
    #[arg(short, long, default_value = "claimed")]
    pub message: String,
}

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Work item identifier.
    pub item: String,

    /// Task identifier.
    pub task: String,

    /// New status message.
    pub message: String,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Only show records for this item.
    #[arg(long)]
    pub item: Option<String>,

    /// Only show records for this task.
    #[arg(long)]
    pub task: Option<String>,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Work item identifier.
    pub item: String,

    /// Task identifier.
    pub task: String,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show who holds the directory lock.
    Show,

    /// Remove the directory lock.
    ///
    /// Refuses to clear a lock that is not stale unless --force is given.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Clear the lock even if it is not stale.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `id` command.
#[derive(Parser, Debug)]
pub struct IdArgs {
    /// File path to derive the identifier from.
    pub path: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
