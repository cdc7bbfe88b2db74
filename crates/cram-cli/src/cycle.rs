//! # `cram cycle` — Prepaid Cycle Management

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use cram_core::{CycleId, StudentId};
use cram_service::StudioService;

/// Cycle subcommands.
#[derive(Args, Debug)]
pub struct CycleArgs {
    #[command(subcommand)]
    command: CycleCommand,
}

#[derive(Subcommand, Debug)]
enum CycleCommand {
    /// Start a student's next cycle with a pre-scheduled session block.
    Start {
        /// Student identifier.
        student: StudentId,
        /// First class date; scheduling walks forward from here.
        start_date: NaiveDate,
    },
    /// Confirm a cycle's completion and issue its invoice.
    Complete {
        /// Cycle identifier.
        id: CycleId,
    },
    /// Show a student's cycles and their sessions.
    Show {
        /// Student identifier.
        student: StudentId,
    },
    /// Cycles within one session of completion, for active students.
    Alerts,
}

/// Dispatch a `cram cycle` subcommand. Returns whether the ledger changed.
pub fn run_cycle(args: &CycleArgs, service: &mut StudioService) -> anyhow::Result<bool> {
    match &args.command {
        CycleCommand::Start {
            student,
            start_date,
        } => {
            let id = service.start_cycle(*student, *start_date)?;
            let cycle = service
                .ledger
                .cycle(id)
                .ok_or_else(|| anyhow::anyhow!("cycle {id} vanished after start"))?;
            println!("started cycle {} ({id})", cycle.cycle_number);
            for session in &cycle.sessions {
                println!("  {}  {}", session.date, session.id);
            }
            Ok(true)
        }
        CycleCommand::Complete { id } => {
            service.complete_cycle(*id)?;
            match service.ledger.payment_for_cycle(*id) {
                Some(payment) => println!(
                    "completed {id}; invoice {} pending ({} won)",
                    payment.id,
                    cram_state::format_won(payment.amount)
                ),
                None => println!("completed {id}"),
            }
            Ok(true)
        }
        CycleCommand::Show { student } => {
            let mut cycles: Vec<_> = service.ledger.cycles_of(*student).collect();
            cycles.sort_by_key(|c| c.cycle_number);
            for cycle in cycles {
                println!(
                    "cycle {}  {}  {}/{}  started {}  {}",
                    cycle.cycle_number,
                    cycle.id,
                    cycle.current_count,
                    cycle.total_count,
                    cycle.started_at,
                    cycle.status,
                );
                for session in &cycle.sessions {
                    let counts = if session.counts_toward_cycle { "counts" } else { "exception" };
                    println!("  {}  {}  {}  {}", session.date, session.id, session.status, counts);
                }
            }
            Ok(false)
        }
        CycleCommand::Alerts => {
            for alert in service.cycle_alerts() {
                println!(
                    "{}  {}  {}  cycle {}  {}/{}  {}",
                    alert.student_name,
                    alert.class_group_name,
                    alert.cycle_id,
                    alert.cycle_number,
                    alert.current_count,
                    alert.total_count,
                    alert.status,
                );
            }
            Ok(false)
        }
    }
}
