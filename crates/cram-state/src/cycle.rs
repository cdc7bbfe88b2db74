//! # Prepaid Attendance Cycle
//!
//! The 8-session prepaid billing unit. A cycle is created *already fully
//! allocated*: the scheduler materializes 8 future-dated placeholder rows
//! up front, and later attendance outcomes (lateness, excused absence) are
//! recorded by mutating those rows, not by inserting new ones as sessions
//! occur.
//!
//! ## States
//!
//! ```text
//! in_progress ──complete()──▶ completed (terminal)
//! ```
//!
//! ## Counting
//!
//! `current_count` is always the number of owned rows with
//! `counts_toward_cycle = true`. Every mutation of the session list
//! recounts, so the invariant holds after each create, update, and delete.
//! [`Cycle::recount`] never transitions the status — a cycle whose count
//! reaches 8 still waits for the administrator to confirm the final
//! calendar session actually happened before [`Cycle::complete`] is
//! invoked. The 8th scheduled date may lie in the future when the count
//! reaches 8, so completion is manual, never automatic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cram_core::{AttendanceId, CycleId, StudentId, Timestamp};

// ── Vocabulary ─────────────────────────────────────────────────────────

/// Lifecycle state of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Capacity committed, sessions still being delivered.
    InProgress,
    /// All 8 countable sessions delivered and confirmed (terminal).
    Completed,
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Outcome recorded for one scheduled session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended.
    Present,
    /// Attended late.
    Late,
    /// Left before the session ended.
    EarlyLeave,
    /// Absent without an accepted excuse; still consumes capacity.
    Absent,
    /// Absent with an accepted excuse; normally paired with
    /// `counts_toward_cycle = false`.
    AbsentExcused,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::EarlyLeave => "early_leave",
            Self::Absent => "absent",
            Self::AbsentExcused => "absent_excused",
        };
        f.write_str(code)
    }
}

/// An attendance status code outside the known vocabulary.
#[derive(Error, Debug)]
#[error("unknown attendance status {0:?}")]
pub struct UnknownAttendanceStatus(pub String);

impl std::str::FromStr for AttendanceStatus {
    type Err = UnknownAttendanceStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "late" => Ok(Self::Late),
            "early_leave" => Ok(Self::EarlyLeave),
            "absent" => Ok(Self::Absent),
            "absent_excused" => Ok(Self::AbsentExcused),
            other => Err(UnknownAttendanceStatus(other.to_string())),
        }
    }
}

/// Why an exception session does not consume cycle capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcuseReason {
    /// School event on the student's side.
    SchoolEvent,
    /// Illness.
    SickLeave,
    /// The studio cancelled the class.
    ClassCancelled,
}

impl std::fmt::Display for ExcuseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::SchoolEvent => "school_event",
            Self::SickLeave => "sick_leave",
            Self::ClassCancelled => "class_cancelled",
        };
        f.write_str(code)
    }
}

/// An excuse reason code outside the known vocabulary.
#[derive(Error, Debug)]
#[error("unknown excuse reason {0:?}")]
pub struct UnknownExcuseReason(pub String);

impl std::str::FromStr for ExcuseReason {
    type Err = UnknownExcuseReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "school_event" => Ok(Self::SchoolEvent),
            "sick_leave" => Ok(Self::SickLeave),
            "class_cancelled" => Ok(Self::ClassCancelled),
            other => Err(UnknownExcuseReason(other.to_string())),
        }
    }
}

// ── Attendance ─────────────────────────────────────────────────────────

/// One scheduled or occurred session.
///
/// `excuse_reason` is populated only on exception rows — rows that do not
/// count toward the cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier.
    pub id: AttendanceId,
    /// The student this session belongs to.
    pub student_id: StudentId,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// Recorded outcome.
    pub status: AttendanceStatus,
    /// Whether this row consumes one unit of the cycle's capacity.
    pub counts_toward_cycle: bool,
    /// Exception reason, for non-counting rows.
    pub excuse_reason: Option<ExcuseReason>,
    /// Free-form note.
    pub memo: Option<String>,
    /// When the row was written.
    pub recorded_at: Timestamp,
}

impl Attendance {
    /// A forward-dated placeholder row, as materialized by the scheduler:
    /// `present`, counting toward the cycle.
    pub fn placeholder(student_id: StudentId, date: NaiveDate) -> Self {
        Self {
            id: AttendanceId::new(),
            student_id,
            date,
            status: AttendanceStatus::Present,
            counts_toward_cycle: true,
            excuse_reason: None,
            memo: None,
            recorded_at: Timestamp::now(),
        }
    }
}

/// A mutation applied to an existing attendance row.
#[derive(Debug, Clone)]
pub struct AttendanceChange {
    /// New outcome.
    pub status: AttendanceStatus,
    /// New capacity flag.
    pub counts_toward_cycle: bool,
    /// New exception reason.
    pub excuse_reason: Option<ExcuseReason>,
    /// New note.
    pub memo: Option<String>,
}

/// What an applied [`AttendanceChange`] did to the row's capacity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUpdate {
    /// Capacity flag before the change.
    pub was_counting: bool,
    /// Capacity flag after the change.
    pub now_counting: bool,
}

impl SessionUpdate {
    /// True exactly on the true → false edge — the trigger for schedule
    /// extension.
    pub fn stopped_counting(&self) -> bool {
        self.was_counting && !self.now_counting
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors from cycle operations.
#[derive(Error, Debug)]
pub enum CycleError {
    /// The cycle was already completed.
    #[error("cycle is already completed")]
    AlreadyCompleted,

    /// Not enough countable sessions to complete.
    #[error("cycle is incomplete: {current} of {total} countable sessions")]
    Incomplete {
        /// Countable sessions so far.
        current: u32,
        /// Required countable sessions.
        total: u32,
    },

    /// No owned row with that identifier.
    #[error("attendance row {0} not found in cycle")]
    SessionNotFound(AttendanceId),
}

// ── Cycle ──────────────────────────────────────────────────────────────

/// A prepaid block of countable class sessions billed as one unit.
///
/// The cycle exclusively owns its attendance rows. All session mutations
/// go through [`Cycle::push_session`], [`Cycle::update_session`], and
/// [`Cycle::remove_session`], each of which recounts before returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    /// Unique identifier.
    pub id: CycleId,
    /// The student this cycle belongs to.
    pub student_id: StudentId,
    /// 1-based position in the student's cycle sequence.
    pub cycle_number: u32,
    /// Countable sessions currently on the books.
    pub current_count: u32,
    /// Sessions in one prepaid block.
    pub total_count: u32,
    /// Lifecycle state.
    pub status: CycleStatus,
    /// First scheduled session date.
    pub started_at: NaiveDate,
    /// Date the administrator confirmed completion.
    pub completed_at: Option<NaiveDate>,
    /// When the cycle was created.
    pub created_at: Timestamp,
    /// Owned attendance rows, in insertion order (chronological for the
    /// generated schedule; ad-hoc rows append at the tail).
    pub sessions: Vec<Attendance>,
}

impl Cycle {
    /// Sessions in one prepaid block.
    pub const SESSIONS_PER_CYCLE: u32 = 8;

    /// Create an empty in-progress cycle. The scheduler fills it.
    pub fn new(id: CycleId, student_id: StudentId, cycle_number: u32, started_at: NaiveDate) -> Self {
        Self {
            id,
            student_id,
            cycle_number,
            current_count: 0,
            total_count: Self::SESSIONS_PER_CYCLE,
            status: CycleStatus::InProgress,
            started_at,
            completed_at: None,
            created_at: Timestamp::now(),
            sessions: Vec::new(),
        }
    }

    /// Whether sessions are still being delivered.
    pub fn is_in_progress(&self) -> bool {
        self.status == CycleStatus::InProgress
    }

    /// Recompute `current_count` from the owned rows.
    ///
    /// Idempotent; never transitions the status.
    pub fn recount(&mut self) -> u32 {
        self.current_count = self
            .sessions
            .iter()
            .filter(|s| s.counts_toward_cycle)
            .count() as u32;
        self.current_count
    }

    /// Mark the cycle completed as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::AlreadyCompleted`] on a completed cycle and
    /// [`CycleError::Incomplete`] while countable sessions are still short
    /// of the total.
    pub fn complete(&mut self, today: NaiveDate) -> Result<(), CycleError> {
        if self.status == CycleStatus::Completed {
            return Err(CycleError::AlreadyCompleted);
        }
        if self.current_count < self.total_count {
            return Err(CycleError::Incomplete {
                current: self.current_count,
                total: self.total_count,
            });
        }
        self.status = CycleStatus::Completed;
        self.completed_at = Some(today);
        Ok(())
    }

    /// Append a session row and recount.
    pub fn push_session(&mut self, session: Attendance) -> AttendanceId {
        let id = session.id;
        self.sessions.push(session);
        self.recount();
        id
    }

    /// Borrow a session row by identifier.
    pub fn session(&self, id: AttendanceId) -> Option<&Attendance> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Apply a change to an existing row, recount, and report what the
    /// change did to the row's capacity flag.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::AlreadyCompleted`] on a completed cycle —
    /// completed cycles are frozen, which is what keeps their
    /// `current_count >= total_count` — and
    /// [`CycleError::SessionNotFound`] if the row is not owned by this
    /// cycle.
    pub fn update_session(
        &mut self,
        id: AttendanceId,
        change: AttendanceChange,
    ) -> Result<SessionUpdate, CycleError> {
        if self.status == CycleStatus::Completed {
            return Err(CycleError::AlreadyCompleted);
        }
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(CycleError::SessionNotFound(id))?;

        let was_counting = session.counts_toward_cycle;
        session.status = change.status;
        session.counts_toward_cycle = change.counts_toward_cycle;
        session.excuse_reason = change.excuse_reason;
        session.memo = change.memo;
        let now_counting = session.counts_toward_cycle;

        self.recount();
        Ok(SessionUpdate {
            was_counting,
            now_counting,
        })
    }

    /// Remove a row and recount.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::AlreadyCompleted`] on a completed cycle and
    /// [`CycleError::SessionNotFound`] if the row is not owned by this
    /// cycle.
    pub fn remove_session(&mut self, id: AttendanceId) -> Result<Attendance, CycleError> {
        if self.status == CycleStatus::Completed {
            return Err(CycleError::AlreadyCompleted);
        }
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or(CycleError::SessionNotFound(id))?;
        let removed = self.sessions.remove(index);
        self.recount();
        Ok(removed)
    }

    /// The latest session date on the books — the schedule's tail.
    pub fn last_session_date(&self) -> Option<NaiveDate> {
        self.sessions.iter().map(|s| s.date).max()
    }
}
