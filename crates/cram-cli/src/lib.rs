//! # cram-cli — Administrator Command-Line Tool
//!
//! Subcommand handlers for the `cram` binary. Each module owns one noun
//! of the administrative surface and exposes a clap `Args` struct plus a
//! `run_*` handler operating on a loaded [`cram_service::StudioService`].
//!
//! The binary (`main.rs`) loads the ledger file, dispatches, and writes
//! the ledger back after a successful mutating command.

pub mod attendance;
pub mod classgroup;
pub mod cycle;
pub mod ledger;
pub mod payment;
pub mod student;

pub use attendance::{run_attendance, AttendanceArgs};
pub use classgroup::{run_class, ClassArgs};
pub use cycle::{run_cycle, CycleArgs};
pub use payment::{run_payment, PaymentArgs};
pub use student::{run_student, StudentArgs};
