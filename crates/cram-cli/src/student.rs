//! # `cram student` — Roster and Enrollment Management

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use cram_core::{ClassGroupId, Grade, StudentId};
use cram_service::{StatusFilter, StudioService};
use cram_state::{EnrollmentStatus, StudentProfile};

use crate::classgroup::parse_time;

/// Student subcommands.
#[derive(Args, Debug)]
pub struct StudentArgs {
    #[command(subcommand)]
    command: StudentCommand,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    /// Register a student.
    Add {
        /// Student name.
        name: String,
        /// Student phone number.
        #[arg(long)]
        phone: String,
        /// School the student attends.
        #[arg(long)]
        school: String,
        /// Grade code: elementary, middle1, middle2, middle3, high.
        #[arg(long)]
        grade: Grade,
        /// Guardian phone number.
        #[arg(long)]
        parent_phone: String,
        /// Class group name or identifier.
        #[arg(long)]
        class: String,
        /// Initial enrollment status.
        #[arg(long, default_value = "inquiry")]
        status: EnrollmentStatus,
        /// Per-student tuition override in won.
        #[arg(long)]
        tuition: Option<i64>,
        /// Free-form note.
        #[arg(long)]
        memo: Option<String>,
    },
    /// List students. Stopped students are hidden unless asked for.
    List {
        /// Restrict to one class group (name or identifier).
        #[arg(long)]
        class: Option<String>,
        /// "all", or one status code to show exactly that status.
        #[arg(long)]
        status: Option<String>,
    },
    /// Change a student's enrollment status.
    Status {
        /// Student identifier.
        id: StudentId,
        /// Target status code.
        to: EnrollmentStatus,
        /// Administrator note for the history record.
        #[arg(long)]
        memo: Option<String>,
        /// First class date; activating with this starts a cycle.
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// Update level-test bookkeeping.
    LevelTest {
        /// Student identifier.
        id: StudentId,
        /// Test date.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Test time, e.g. "14:00".
        #[arg(long)]
        time: Option<String>,
        /// Test outcome notes.
        #[arg(long)]
        result: Option<String>,
    },
    /// Show a student's enrollment history.
    History {
        /// Student identifier.
        id: StudentId,
    },
}

/// Resolve a class group given by name or identifier.
pub fn resolve_group(service: &StudioService, given: &str) -> anyhow::Result<ClassGroupId> {
    if let Some(group) = service.ledger.class_group_by_name(given) {
        return Ok(group.id);
    }
    let id: ClassGroupId = given
        .parse()
        .with_context(|| format!("no class group named {given:?} and not an identifier"))?;
    anyhow::ensure!(
        service.ledger.class_group(id).is_some(),
        "class group {id} not found"
    );
    Ok(id)
}

fn parse_filter(given: Option<&str>) -> anyhow::Result<StatusFilter> {
    match given {
        None => Ok(StatusFilter::default()),
        Some("all") => Ok(StatusFilter::All),
        Some(code) => Ok(StatusFilter::Only(code.parse()?)),
    }
}

/// Dispatch a `cram student` subcommand. Returns whether the ledger
/// changed.
pub fn run_student(args: &StudentArgs, service: &mut StudioService) -> anyhow::Result<bool> {
    match &args.command {
        StudentCommand::Add {
            name,
            phone,
            school,
            grade,
            parent_phone,
            class,
            status,
            tuition,
            memo,
        } => {
            let class_group_id = resolve_group(service, class)?;
            let id = service.register_student(
                StudentProfile {
                    name: name.clone(),
                    phone: phone.clone(),
                    school: school.clone(),
                    grade: *grade,
                    parent_phone: parent_phone.clone(),
                    class_group_id,
                    tuition_override: *tuition,
                    memo: memo.clone(),
                },
                *status,
            )?;
            println!("registered {id}");
            Ok(true)
        }
        StudentCommand::List { class, status } => {
            let class_group = class
                .as_deref()
                .map(|given| resolve_group(service, given))
                .transpose()?;
            let filter = parse_filter(status.as_deref())?;
            for student in service.list_students(class_group, filter) {
                let cycle = service
                    .ledger
                    .active_cycle(student.id)
                    .map(|c| format!("cycle {} ({}/{})", c.cycle_number, c.current_count, c.total_count))
                    .unwrap_or_else(|| "no cycle".to_string());
                println!(
                    "{}  {}  {}  {}  {}",
                    student.id, student.name, student.grade, student.enrollment_status, cycle,
                );
            }
            Ok(false)
        }
        StudentCommand::Status {
            id,
            to,
            memo,
            start_date,
        } => {
            service.change_status(*id, *to, memo.clone(), *start_date)?;
            println!("{id} is now {to}");
            Ok(true)
        }
        StudentCommand::LevelTest {
            id,
            date,
            time,
            result,
        } => {
            let time = time.as_deref().map(parse_time).transpose()?;
            service.update_level_test(*id, *date, time, result.clone())?;
            println!("level test updated for {id}");
            Ok(true)
        }
        StudentCommand::History { id } => {
            let student = service
                .ledger
                .student(*id)
                .ok_or_else(|| anyhow::anyhow!("student {id} not found"))?;
            for record in &student.history {
                let from = record
                    .from
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(registered)".to_string());
                let memo = record.memo.as_deref().unwrap_or("");
                println!("{}  {} -> {}  {}", record.changed_at, from, record.to, memo);
            }
            Ok(false)
        }
    }
}
