//! # Service Error
//!
//! Aggregates the domain machines' errors behind one type and adds the
//! conditions only the orchestration layer can detect: missing entities,
//! the single-in-progress-cycle guard, and the cross-cycle payment gate.
//!
//! Every variant is a locally-detected precondition violation. Nothing
//! here is transient or retryable, and the service never converts one
//! condition into another — callers (a CLI today, an HTTP layer tomorrow)
//! map them to their own surface.

use thiserror::Error;

use cram_core::{AttendanceId, ClassGroupId, CycleId, PaymentId, StudentId};
use cram_state::{
    BillingError, ClassGroupError, CycleError, EnrollmentError, ScheduleError,
};

/// Errors surfaced by the service verbs.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No student with that identifier.
    #[error("student {0} not found")]
    StudentNotFound(StudentId),

    /// No class group with that identifier.
    #[error("class group {0} not found")]
    ClassGroupNotFound(ClassGroupId),

    /// No cycle with that identifier.
    #[error("cycle {0} not found")]
    CycleNotFound(CycleId),

    /// No attendance row with that identifier in any cycle.
    #[error("attendance row {0} not found")]
    AttendanceNotFound(AttendanceId),

    /// No payment with that identifier.
    #[error("payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// Attendance requires an in-progress cycle to book against.
    #[error("student {0} has no cycle in progress")]
    NoActiveCycle(StudentId),

    /// At most one cycle per student may be in progress.
    #[error("student {student_id} already has cycle {cycle_number} in progress")]
    CycleAlreadyInProgress {
        /// The student.
        student_id: StudentId,
        /// The cycle already running.
        cycle_number: u32,
    },

    /// The predecessor cycle's tuition has not been confirmed.
    #[error("cycle {cycle_id} (number {cycle_number}) is completed but not paid")]
    PriorCycleUnpaid {
        /// The unpaid predecessor.
        cycle_id: CycleId,
        /// Its position in the student's sequence.
        cycle_number: u32,
    },

    /// Class group names are unique within the studio.
    #[error("class group named {0:?} already exists")]
    DuplicateClassGroupName(String),

    /// Enrollment machine rejection.
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),

    /// Class group construction rejection.
    #[error(transparent)]
    ClassGroup(#[from] ClassGroupError),

    /// Cycle machine rejection.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Scheduler rejection.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Billing machine rejection.
    #[error(transparent)]
    Billing(#[from] BillingError),
}
