//! # Enrollment Lifecycle State Machine
//!
//! Models a student's lifecycle stage from first inquiry through active
//! lessons to a stop, with re-entry.
//!
//! ## States
//!
//! ```text
//! inquiry ──▶ level_test ──▶ active ──▶ stopped
//!    │             │            ▲          │
//!    │             └──▶ stopped │          │
//!    ├──▶ active                └──────────┘
//!    └──▶ stopped              (reactivation)
//! ```
//!
//! ## Design Decision
//!
//! A validated enum with a static adjacency table, not typestate: the
//! status is persisted, filtered on, and chosen by an administrator at
//! runtime, so the state is never known at compile time. Invalid
//! transitions are rejected with [`EnrollmentError::InvalidTransition`].
//!
//! Every accepted transition appends one [`EnrollmentRecord`] to the
//! student's owned history before the status mutates. The history is
//! append-only: exactly one record has `from = None` (the registration
//! record, written by [`Student::register`]), and no record is ever edited
//! or removed.
//!
//! Starting a billing cycle on activation is deliberately *not* this
//! machine's job — activation and cycle start are decoupled so an
//! enrollment decision can precede the first class date. The service layer
//! orchestrates that side effect.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cram_core::{ClassGroupId, Grade, StudentId, Timestamp, TuitionTable};

// ── Enrollment status ──────────────────────────────────────────────────

/// A student's lifecycle stage, independent of any particular cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// First contact; nothing scheduled yet.
    Inquiry,
    /// A placement level test is scheduled or being evaluated.
    LevelTest,
    /// Taking lessons.
    Active,
    /// No longer attending; may re-enroll later.
    Stopped,
}

impl EnrollmentStatus {
    /// The wire code for this status.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Inquiry => "inquiry",
            Self::LevelTest => "level_test",
            Self::Active => "active",
            Self::Stopped => "stopped",
        }
    }

    /// The statuses reachable from this one in a single transition.
    ///
    /// This is the whole transition table; there are no self-loops.
    pub fn allowed_targets(&self) -> &'static [EnrollmentStatus] {
        match self {
            Self::Inquiry => &[Self::LevelTest, Self::Active, Self::Stopped],
            Self::LevelTest => &[Self::Active, Self::Stopped],
            Self::Active => &[Self::Stopped],
            Self::Stopped => &[Self::Active],
        }
    }

    /// Whether a single transition from `self` to `target` is allowed.
    pub fn can_transition(&self, target: EnrollmentStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = EnrollmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inquiry" => Ok(Self::Inquiry),
            "level_test" => Ok(Self::LevelTest),
            "active" => Ok(Self::Active),
            "stopped" => Ok(Self::Stopped),
            other => Err(EnrollmentError::UnknownStatus(other.to_string())),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors from enrollment lifecycle operations.
#[derive(Error, Debug)]
pub enum EnrollmentError {
    /// The transition edge does not exist in the table.
    #[error("invalid enrollment transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: EnrollmentStatus,
        /// Attempted target status.
        to: EnrollmentStatus,
    },

    /// A status code outside the known vocabulary.
    #[error("unknown enrollment status {0:?}")]
    UnknownStatus(String),
}

// ── History ────────────────────────────────────────────────────────────

/// One immutable entry in a student's enrollment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Status before the change; `None` only for the registration record.
    pub from: Option<EnrollmentStatus>,
    /// Status after the change.
    pub to: EnrollmentStatus,
    /// When the change was recorded.
    pub changed_at: Timestamp,
    /// Administrator note attached to the change.
    pub memo: Option<String>,
}

// ── Student ────────────────────────────────────────────────────────────

/// Profile data supplied at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student name.
    pub name: String,
    /// Student phone number.
    pub phone: String,
    /// School the student attends.
    pub school: String,
    /// School grade band.
    pub grade: Grade,
    /// Guardian phone number.
    pub parent_phone: String,
    /// Assigned class group.
    pub class_group_id: ClassGroupId,
    /// Per-student tuition override in won; `None` means the grade rate.
    pub tuition_override: Option<i64>,
    /// Free-form note.
    pub memo: Option<String>,
}

/// A student, with owned enrollment history and level-test bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier.
    pub id: StudentId,
    /// Student name.
    pub name: String,
    /// Student phone number.
    pub phone: String,
    /// School the student attends.
    pub school: String,
    /// School grade band.
    pub grade: Grade,
    /// Guardian phone number.
    pub parent_phone: String,
    /// Assigned class group.
    pub class_group_id: ClassGroupId,
    /// Per-student tuition override in won; `None` means the grade rate.
    pub tuition_override: Option<i64>,
    /// Free-form note.
    pub memo: Option<String>,
    /// Current lifecycle stage.
    pub enrollment_status: EnrollmentStatus,
    /// Scheduled level-test date.
    pub level_test_date: Option<NaiveDate>,
    /// Scheduled level-test time.
    pub level_test_time: Option<NaiveTime>,
    /// Level-test outcome notes.
    pub level_test_result: Option<String>,
    /// Append-only enrollment history, oldest first.
    pub history: Vec<EnrollmentRecord>,
    /// When the student was registered.
    pub created_at: Timestamp,
}

impl Student {
    /// Register a new student in the given initial status.
    ///
    /// Writes the registration record (`from = None`) atomically with the
    /// student itself — a `Student` cannot exist without it.
    pub fn register(id: StudentId, profile: StudentProfile, initial: EnrollmentStatus) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name: profile.name,
            phone: profile.phone,
            school: profile.school,
            grade: profile.grade,
            parent_phone: profile.parent_phone,
            class_group_id: profile.class_group_id,
            tuition_override: profile.tuition_override,
            memo: profile.memo,
            enrollment_status: initial,
            level_test_date: None,
            level_test_time: None,
            level_test_result: None,
            history: vec![EnrollmentRecord {
                from: None,
                to: initial,
                changed_at: now,
                memo: None,
            }],
            created_at: now,
        }
    }

    /// Change the enrollment status along an allowed edge.
    ///
    /// Appends the history record, then mutates the status.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::InvalidTransition`] if the edge is not in
    /// the table.
    pub fn change_status(
        &mut self,
        target: EnrollmentStatus,
        memo: Option<String>,
    ) -> Result<(), EnrollmentError> {
        if !self.enrollment_status.can_transition(target) {
            return Err(EnrollmentError::InvalidTransition {
                from: self.enrollment_status,
                to: target,
            });
        }
        self.history.push(EnrollmentRecord {
            from: Some(self.enrollment_status),
            to: target,
            changed_at: Timestamp::now(),
            memo,
        });
        self.enrollment_status = target;
        Ok(())
    }

    /// Update level-test bookkeeping. Does not touch the status machine.
    pub fn update_level_test(
        &mut self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        result: Option<String>,
    ) {
        self.level_test_date = date;
        self.level_test_time = time;
        self.level_test_result = result;
    }

    /// The tuition this student is billed per cycle: the override if set,
    /// otherwise the grade rate from the table.
    pub fn effective_tuition(&self, table: &TuitionTable) -> i64 {
        table.effective(self.tuition_override, self.grade)
    }

    /// The first time each status was entered, taken from the history.
    pub fn first_entered(&self, status: EnrollmentStatus) -> Option<Timestamp> {
        self.history
            .iter()
            .find(|record| record.to == status)
            .map(|record| record.changed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StudentProfile {
        StudentProfile {
            name: "Kim Student".to_string(),
            phone: "010-1111-2222".to_string(),
            school: "Seoul Elementary".to_string(),
            grade: Grade::Elementary,
            parent_phone: "010-3333-4444".to_string(),
            class_group_id: ClassGroupId::new(),
            tuition_override: None,
            memo: None,
        }
    }

    fn student(initial: EnrollmentStatus) -> Student {
        Student::register(StudentId::new(), profile(), initial)
    }

    // ── Transition table ───────────────────────────────────────────────

    #[test]
    fn inquiry_fans_out() {
        assert!(EnrollmentStatus::Inquiry.can_transition(EnrollmentStatus::LevelTest));
        assert!(EnrollmentStatus::Inquiry.can_transition(EnrollmentStatus::Active));
        assert!(EnrollmentStatus::Inquiry.can_transition(EnrollmentStatus::Stopped));
    }

    #[test]
    fn stopped_only_reactivates() {
        assert_eq!(
            EnrollmentStatus::Stopped.allowed_targets(),
            &[EnrollmentStatus::Active]
        );
    }

    #[test]
    fn no_self_loops() {
        for status in [
            EnrollmentStatus::Inquiry,
            EnrollmentStatus::LevelTest,
            EnrollmentStatus::Active,
            EnrollmentStatus::Stopped,
        ] {
            assert!(!status.can_transition(status));
        }
    }

    #[test]
    fn active_cannot_regress_to_level_test() {
        assert!(!EnrollmentStatus::Active.can_transition(EnrollmentStatus::LevelTest));
    }

    // ── change_status ──────────────────────────────────────────────────

    #[test]
    fn accepted_transition_appends_history() {
        let mut s = student(EnrollmentStatus::Inquiry);
        s.change_status(EnrollmentStatus::LevelTest, Some("booked test".to_string()))
            .unwrap();

        assert_eq!(s.enrollment_status, EnrollmentStatus::LevelTest);
        assert_eq!(s.history.len(), 2);
        let record = &s.history[1];
        assert_eq!(record.from, Some(EnrollmentStatus::Inquiry));
        assert_eq!(record.to, EnrollmentStatus::LevelTest);
        assert_eq!(record.memo.as_deref(), Some("booked test"));
    }

    #[test]
    fn rejected_transition_leaves_student_untouched() {
        let mut s = student(EnrollmentStatus::Stopped);
        let err = s
            .change_status(EnrollmentStatus::LevelTest, None)
            .unwrap_err();

        match err {
            EnrollmentError::InvalidTransition { from, to } => {
                assert_eq!(from, EnrollmentStatus::Stopped);
                assert_eq!(to, EnrollmentStatus::LevelTest);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(s.enrollment_status, EnrollmentStatus::Stopped);
        assert_eq!(s.history.len(), 1);
    }

    #[test]
    fn reactivation_round_trip() {
        let mut s = student(EnrollmentStatus::Active);
        s.change_status(EnrollmentStatus::Stopped, None).unwrap();
        s.change_status(EnrollmentStatus::Active, Some("re-enrolled".to_string()))
            .unwrap();
        assert_eq!(s.enrollment_status, EnrollmentStatus::Active);
        assert_eq!(s.history.len(), 3);
    }

    // ── Registration record ────────────────────────────────────────────

    #[test]
    fn registration_writes_the_null_from_record() {
        let s = student(EnrollmentStatus::Inquiry);
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.history[0].from, None);
        assert_eq!(s.history[0].to, EnrollmentStatus::Inquiry);
    }

    #[test]
    fn only_registration_has_null_from() {
        let mut s = student(EnrollmentStatus::Inquiry);
        s.change_status(EnrollmentStatus::Active, None).unwrap();
        s.change_status(EnrollmentStatus::Stopped, None).unwrap();
        let null_from = s.history.iter().filter(|r| r.from.is_none()).count();
        assert_eq!(null_from, 1);
    }

    // ── Queries ────────────────────────────────────────────────────────

    #[test]
    fn first_entered_finds_earliest() {
        let mut s = student(EnrollmentStatus::Inquiry);
        assert!(s.first_entered(EnrollmentStatus::Inquiry).is_some());
        assert!(s.first_entered(EnrollmentStatus::Active).is_none());
        s.change_status(EnrollmentStatus::Active, None).unwrap();
        assert!(s.first_entered(EnrollmentStatus::Active).is_some());
    }

    #[test]
    fn effective_tuition_prefers_override() {
        let table = TuitionTable::default();
        let mut s = student(EnrollmentStatus::Inquiry);
        assert_eq!(s.effective_tuition(&table), 180_000);
        s.tuition_override = Some(150_000);
        assert_eq!(s.effective_tuition(&table), 150_000);
    }

    // ── Wire vocabulary ────────────────────────────────────────────────

    #[test]
    fn status_wire_codes() {
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::LevelTest).unwrap(),
            r#""level_test""#
        );
        assert_eq!(
            "stopped".parse::<EnrollmentStatus>().unwrap(),
            EnrollmentStatus::Stopped
        );
        assert!("paused".parse::<EnrollmentStatus>().is_err());
    }
}
