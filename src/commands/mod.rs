//! Command implementations for dirclaim.
//!
//! Each handler returns the process exit code on success. Negative protocol
//! results (already claimed, nothing to update) are not errors: they exit
//! with `DECLINED` so shell callers can branch on them.

use crate::cli::{
    ClaimArgs, Cli, Command, IdArgs, LockAction, LockClearArgs, LockCommand, ShowArgs, StatusArgs,
    UpdateArgs,
};
use dirclaim::config::Config;
use dirclaim::coordinator::{ClaimOutcome, ClaimSession, Coordinator};
use dirclaim::error::{ClaimError, Result};
use dirclaim::exit_codes;
use dirclaim::identifier::extract_identifier;
use dirclaim::locks::{LockInfo, format_age};
use dirclaim::status::TIMESTAMP_FORMAT;


/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    // The only command that works without a shared directory.
    if let Command::Id(args) = &cli.command {
        return cmd_id(args);
    }

    let coord = open_coordinator(&cli)?;
    match cli.command {
        Command::Claim(args) => cmd_claim(&coord, args),
        Command::Update(args) => cmd_update(&coord, args),
        Command::Status(args) => cmd_status(&coord, args),
        Command::Show(args) => cmd_show(&coord, args),
        Command::Lock(lock_cmd) => dispatch_lock(&coord, lock_cmd),
        Command::Id(args) => cmd_id(&args),
    }
}

/// Build the coordinator from `--dir`, `--config` and `--timeout`.
fn open_coordinator(cli: &Cli) -> Result<Coordinator> {
    let dir = cli.dir.as_ref().ok_or_else(|| {
        ClaimError::UserError("--dir is required for this command".to_string())
    })?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(timeout) = cli.timeout {
        config.lock_timeout_secs = timeout;
    }

    Coordinator::with_config(dir, config)
}

/// Dispatch lock subcommands.
fn dispatch_lock(coord: &Coordinator, lock_cmd: LockCommand) -> Result<i32> {
    match lock_cmd.action {
        LockAction::Show => cmd_lock_show(coord),
        LockAction::Clear(args) => cmd_lock_clear(coord, args),
    }
}

fn cmd_claim(coord: &Coordinator, args: ClaimArgs) -> Result<i32> {
    match coord.claim(&args.item, &args.task, &args.message)? {
        ClaimOutcome::Claimed(session) => {
            println!("Claimed {}.{}", session.item(), session.task());
            Ok(exit_codes::SUCCESS)
        }
        ClaimOutcome::AlreadyClaimed => {
            println!("Already claimed: {}.{}", args.item, args.task);
            Ok(exit_codes::DECLINED)
        }
    }
}

fn cmd_update(coord: &Coordinator, args: UpdateArgs) -> Result<i32> {
    let session = ClaimSession::resume(&args.item, &args.task)?;

    if coord.update_status(&session, &args.message)? {
        println!("Updated {}.{}", args.item, args.task);
        Ok(exit_codes::SUCCESS)
    } else {
        println!("Not claimed: {}.{}", args.item, args.task);
        Ok(exit_codes::DECLINED)
    }
}

fn cmd_status(coord: &Coordinator, args: StatusArgs) -> Result<i32> {
    let entries: Vec<_> = coord
        .list_status()?
        .into_iter()
        .filter(|e| args.item.as_ref().is_none_or(|item| &e.item == item))
        .filter(|e| args.task.as_ref().is_none_or(|task| &e.task == task))
        .collect();

    if entries.is_empty() {
        println!("No status records in {}", coord.dir().display());
        return Ok(exit_codes::SUCCESS);
    }

    for entry in &entries {
        match &entry.record {
            Ok(record) => println!("{}", record),
            Err(why) => println!("{}.{}  (unreadable: {})", entry.item, entry.task, why),
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn cmd_show(coord: &Coordinator, args: ShowArgs) -> Result<i32> {
    let Some(record) = coord.read_status(&args.item, &args.task)? else {
        println!("Not claimed: {}.{}", args.item, args.task);
        return Ok(exit_codes::DECLINED);
    };

    println!("Item:       {}", record.item);
    println!("Task:       {}", record.task);
    println!("Updated:    {}", record.timestamp.format(TIMESTAMP_FORMAT));
    println!("Host:       {}", record.host);
    println!("PID:        {}", record.pid);
    println!("Message:    {}", record.message);
    println!(
        "Path:       {}",
        coord.status_path(&args.item, &args.task).display()
    );

    Ok(exit_codes::SUCCESS)
}

fn cmd_lock_show(coord: &Coordinator) -> Result<i32> {
    match coord.inspect_lock()? {
        Some(info) => print_lock_details("Lock held", &info),
        None => println!("Unlocked: {}", coord.lock_path().display()),
    }
    Ok(exit_codes::SUCCESS)
}

fn cmd_lock_clear(coord: &Coordinator, args: LockClearArgs) -> Result<i32> {
    let Some(info) = coord.inspect_lock()? else {
        println!("Unlocked: {}", coord.lock_path().display());
        return Ok(exit_codes::SUCCESS);
    };

    if !info.is_stale && !args.force {
        return Err(ClaimError::UserError(format!(
            "refusing to clear a lock that is not stale without --force flag.\n\n\
             Clearing the lock while its holder is active breaks exactly-once claiming.\n\
             Only clear it if you are certain the holder has crashed.\n\n\
             Current lock: {}",
            info
        )));
    }

    let cleared = coord.clear_lock()?;
    print_lock_details("Cleared lock", &cleared);
    Ok(exit_codes::SUCCESS)
}

fn print_lock_details(heading: &str, info: &LockInfo) {
    println!("{}: {}", heading, info.path.display());
    println!();
    println!("Lock details:");
    match &info.metadata {
        Some(meta) => {
            println!("  Owner:      {}", meta.owner);
            if let Some(pid) = meta.pid {
                println!("  PID:        {}", pid);
            }
            println!(
                "  Created:    {}",
                meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("  Action:     {}", meta.action);
        }
        None => println!("  Metadata:   unreadable"),
    }
    println!("  Age:        {}", format_age(info.age));
    if info.is_stale {
        println!("  Status:     STALE");
    }
}

fn cmd_id(args: &IdArgs) -> Result<i32> {
    let id = extract_identifier(&args.path).ok_or_else(|| {
        ClaimError::InvalidIdentifier(format!(
            "'{}' has no file extension to strip",
            args.path.display()
        ))
    })?;

    println!("{}", id);
    Ok(exit_codes::SUCCESS)
}
