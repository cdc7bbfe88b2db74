//! # `cram attendance` — Roll Call and Corrections

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use cram_core::{AttendanceId, StudentId};
use cram_service::StudioService;
use cram_state::{AttendanceChange, AttendanceStatus, ExcuseReason};

use crate::student;

/// Attendance subcommands.
#[derive(Args, Debug)]
pub struct AttendanceArgs {
    #[command(subcommand)]
    command: AttendanceCommand,
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    /// Record an ad-hoc session against the student's active cycle.
    Record {
        /// Student identifier.
        student: StudentId,
        /// Session date.
        date: NaiveDate,
        /// Outcome code: present, late, early_leave, absent,
        /// absent_excused.
        #[arg(long, default_value = "present")]
        status: AttendanceStatus,
        /// Record as an exception that does not consume cycle capacity.
        #[arg(long)]
        no_count: bool,
        /// Exception reason: school_event, sick_leave, class_cancelled.
        #[arg(long)]
        excuse: Option<ExcuseReason>,
        /// Free-form note.
        #[arg(long)]
        memo: Option<String>,
    },
    /// Rewrite an attendance row's outcome.
    Update {
        /// Attendance row identifier.
        id: AttendanceId,
        /// New outcome code.
        #[arg(long)]
        status: AttendanceStatus,
        /// Mark as an exception that does not consume cycle capacity.
        #[arg(long)]
        no_count: bool,
        /// Exception reason.
        #[arg(long)]
        excuse: Option<ExcuseReason>,
        /// Free-form note.
        #[arg(long)]
        memo: Option<String>,
    },
    /// Delete an attendance row.
    Delete {
        /// Attendance row identifier.
        id: AttendanceId,
    },
    /// Show the roll call for a date.
    Daily {
        /// The date.
        date: NaiveDate,
        /// Restrict to one class group (name or identifier).
        #[arg(long)]
        class: Option<String>,
    },
}

/// Dispatch a `cram attendance` subcommand. Returns whether the ledger
/// changed.
pub fn run_attendance(args: &AttendanceArgs, service: &mut StudioService) -> anyhow::Result<bool> {
    match &args.command {
        AttendanceCommand::Record {
            student: student_id,
            date,
            status,
            no_count,
            excuse,
            memo,
        } => {
            let id = service.record_attendance(
                *student_id,
                *date,
                *status,
                !no_count,
                *excuse,
                memo.clone(),
            )?;
            let cycle = service.ledger.active_cycle(*student_id);
            let count = cycle.map(|c| c.current_count).unwrap_or(0);
            let total = cycle.map(|c| c.total_count).unwrap_or(0);
            println!("recorded {id} ({count}/{total})");
            Ok(true)
        }
        AttendanceCommand::Update {
            id,
            status,
            no_count,
            excuse,
            memo,
        } => {
            service.update_attendance(
                *id,
                AttendanceChange {
                    status: *status,
                    counts_toward_cycle: !no_count,
                    excuse_reason: *excuse,
                    memo: memo.clone(),
                },
            )?;
            println!("updated {id}");
            Ok(true)
        }
        AttendanceCommand::Delete { id } => {
            service.delete_attendance(*id)?;
            println!("deleted {id}");
            Ok(true)
        }
        AttendanceCommand::Daily { date, class } => {
            let class_group = class
                .as_deref()
                .map(|given| student::resolve_group(service, given))
                .transpose()?;
            for row in service.daily_attendance(*date, class_group) {
                let name = service
                    .ledger
                    .student(row.student_id)
                    .map(|s| s.name.as_str())
                    .unwrap_or("?");
                let counts = if row.counts_toward_cycle { "counts" } else { "exception" };
                println!("{}  {}  {}  {}", row.id, name, row.status, counts);
            }
            Ok(false)
        }
    }
}
