//! # `cram class` — Class Group Management

use chrono::NaiveTime;
use clap::{Args, Subcommand};

use cram_core::WeekdaySet;
use cram_service::StudioService;

/// Class group subcommands.
#[derive(Args, Debug)]
pub struct ClassArgs {
    #[command(subcommand)]
    command: ClassCommand,
}

#[derive(Subcommand, Debug)]
enum ClassCommand {
    /// Create a class group.
    Add {
        /// Display name, unique within the studio.
        name: String,
        /// Meeting days as comma-separated codes, e.g. "mon,wed".
        #[arg(long)]
        days: String,
        /// Session start time, e.g. "14:30".
        #[arg(long)]
        start_time: String,
        /// Default session length in minutes.
        #[arg(long, default_value_t = 90)]
        duration: u32,
        /// Free-form note.
        #[arg(long)]
        memo: Option<String>,
    },
    /// List class groups.
    List,
    /// Stop a class group from accepting students.
    Deactivate {
        /// Class group name or identifier.
        group: String,
    },
}

/// Parse `"14:30"` or `"14:30:00"`.
pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| anyhow::anyhow!("invalid time {s:?}: {e}"))
}

/// Dispatch a `cram class` subcommand. Returns whether the ledger changed.
pub fn run_class(args: &ClassArgs, service: &mut StudioService) -> anyhow::Result<bool> {
    match &args.command {
        ClassCommand::Add {
            name,
            days,
            start_time,
            duration,
            memo,
        } => {
            let weekdays = WeekdaySet::parse(days)?;
            let start = parse_time(start_time)?;
            let id = service.add_class_group(name, weekdays, start, *duration, memo.clone())?;
            println!("created {id}");
            Ok(true)
        }
        ClassCommand::List => {
            for group in service.ledger.class_groups.values() {
                let state = if group.is_active { "active" } else { "inactive" };
                println!(
                    "{}  {}  {} {}  {}min  [{}]",
                    group.id,
                    group.name,
                    group.weekdays,
                    group.start_time.format("%H:%M"),
                    group.default_duration_minutes,
                    state,
                );
            }
            Ok(false)
        }
        ClassCommand::Deactivate { group } => {
            let id = crate::student::resolve_group(service, group)?;
            service.deactivate_class_group(id)?;
            println!("deactivated {id}");
            Ok(true)
        }
    }
}
