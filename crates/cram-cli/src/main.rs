//! # cram CLI entry point
//!
//! Parses command-line arguments, loads the JSON ledger, dispatches to
//! the subcommand handlers, and writes the ledger back after a successful
//! mutating command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cram_cli::attendance::{run_attendance, AttendanceArgs};
use cram_cli::classgroup::{run_class, ClassArgs};
use cram_cli::cycle::{run_cycle, CycleArgs};
use cram_cli::ledger::{load_service, save_service};
use cram_cli::payment::{run_payment, PaymentArgs};
use cram_cli::student::{run_student, StudentArgs};

/// cram — tutoring studio administration.
///
/// Tracks students, class enrollment, attendance, prepaid 8-session
/// cycles, and tuition billing over a JSON ledger file.
#[derive(Parser, Debug)]
#[command(name = "cram", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the ledger file.
    #[arg(long, global = true, default_value = "cram-ledger.json")]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Class group management (add, list).
    Class(ClassArgs),

    /// Student roster and enrollment lifecycle.
    Student(StudentArgs),

    /// Roll call: record, correct, and delete attendance rows.
    Attendance(AttendanceArgs),

    /// Prepaid cycle management (start, complete, alerts).
    Cycle(CycleArgs),

    /// Tuition invoices (list, confirm, notice).
    Payment(PaymentArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut service = load_service(&cli.ledger)?;

    let changed = match &cli.command {
        Commands::Class(args) => run_class(args, &mut service)?,
        Commands::Student(args) => run_student(args, &mut service)?,
        Commands::Attendance(args) => run_attendance(args, &mut service)?,
        Commands::Cycle(args) => run_cycle(args, &mut service)?,
        Commands::Payment(args) => run_payment(args, &mut service)?,
    };

    if changed {
        save_service(&cli.ledger, &service)?;
    }
    Ok(())
}
