//! # cram-state — Domain State Machines
//!
//! Implements the state machines of the studio stack as validated enums
//! with owned history. Each machine lives in its own module; transitions
//! are methods that reject invalid edges with structured errors.
//!
//! ## State Machines
//!
//! - **Enrollment** (`enrollment.rs`): a student's lifecycle stage,
//!   `inquiry → level_test → active → stopped` with `stopped → active`
//!   re-entry, plus the append-only enrollment history.
//!
//! - **Cycle** (`cycle.rs`): the prepaid 8-session attendance cycle —
//!   created fully allocated, recounted after every session mutation,
//!   completed explicitly by the administrator.
//!
//! - **Payment** (`billing.rs`): `pending → paid`, one per completed
//!   cycle, plus tuition-notice rendering.
//!
//! ## Supporting Modules
//!
//! - **Class groups** (`classgroup.rs`): the weekly meeting pattern that
//!   schedules are derived from.
//!
//! - **Scheduler** (`schedule.rs`): placeholder-row materialization over
//!   the pure calendar scan in [`cram_core::calendar`].
//!
//! ## Design
//!
//! No machine here reaches across to another: activation starting a cycle,
//! completion issuing an invoice, and exceptions extending a schedule are
//! cross-machine side effects owned by the service layer. That keeps each
//! module testable over nothing but its own state.

pub mod billing;
pub mod classgroup;
pub mod cycle;
pub mod enrollment;
pub mod schedule;

// ─── Enrollment re-exports ──────────────────────────────────────────

pub use enrollment::{
    EnrollmentError, EnrollmentRecord, EnrollmentStatus, Student, StudentProfile,
};

// ─── Class group re-exports ─────────────────────────────────────────

pub use classgroup::{ClassGroup, ClassGroupError};

// ─── Cycle re-exports ───────────────────────────────────────────────

pub use cycle::{
    Attendance, AttendanceChange, AttendanceStatus, Cycle, CycleError, CycleStatus, ExcuseReason,
    SessionUpdate, UnknownAttendanceStatus, UnknownExcuseReason,
};

// ─── Scheduler re-exports ───────────────────────────────────────────

pub use schedule::{extend_schedule, generate_schedule, ScheduleError};

// ─── Billing re-exports ─────────────────────────────────────────────

pub use billing::{
    format_won, BillingError, Payment, PaymentMethod, PaymentStatus, TuitionNotice,
    UnknownPaymentMethod, UnknownPaymentStatus,
};
