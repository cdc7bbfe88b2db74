//! # Studio Lifecycle — End-to-End Scenario Tests
//!
//! Exercises the full administrative flow through the service verbs:
//! registration, activation with schedule materialization, exception
//! handling with schedule extension, cycle completion into a pending
//! invoice, payment confirmation, and the cross-cycle payment gate.

use chrono::{NaiveDate, NaiveTime};

use cram_core::{AttendanceId, ClassGroupId, Grade, StudentId, Weekday, WeekdaySet};
use cram_service::{ServiceError, StatusFilter, StudioService};
use cram_state::{
    AttendanceChange, AttendanceStatus, CycleError, CycleStatus, EnrollmentError,
    EnrollmentStatus, ExcuseReason, PaymentMethod, PaymentStatus,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service_with_group() -> (StudioService, ClassGroupId) {
    let mut service = StudioService::default();
    let group = service
        .add_class_group(
            "Mon/Wed A",
            WeekdaySet::new([Weekday::Mon, Weekday::Wed]).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            90,
            None,
        )
        .unwrap();
    (service, group)
}

fn register(
    service: &mut StudioService,
    group: ClassGroupId,
    name: &str,
    initial: EnrollmentStatus,
) -> StudentId {
    service
        .register_student(
            cram_state::StudentProfile {
                name: name.to_string(),
                phone: "010-1111-2222".to_string(),
                school: "Seoul Elementary".to_string(),
                grade: Grade::Elementary,
                parent_phone: "010-3333-4444".to_string(),
                class_group_id: group,
                tuition_override: None,
                memo: None,
            },
            initial,
        )
        .unwrap()
}

/// Register a student and activate them with a 2026-03-02 start date.
fn active_student(service: &mut StudioService, group: ClassGroupId) -> StudentId {
    let student = register(service, group, "Kim Student", EnrollmentStatus::LevelTest);
    service
        .change_status(
            student,
            EnrollmentStatus::Active,
            None,
            Some(date(2026, 3, 2)),
        )
        .unwrap();
    student
}

fn session_on(service: &StudioService, student: StudentId, day: NaiveDate) -> AttendanceId {
    service
        .ledger
        .active_cycle(student)
        .unwrap()
        .sessions
        .iter()
        .find(|s| s.date == day)
        .unwrap()
        .id
}

fn excused_change() -> AttendanceChange {
    AttendanceChange {
        status: AttendanceStatus::AbsentExcused,
        counts_toward_cycle: false,
        excuse_reason: Some(ExcuseReason::SickLeave),
        memo: None,
    }
}

// ---------------------------------------------------------------------------
// Activation and schedule materialization
// ---------------------------------------------------------------------------

#[test]
fn activation_with_start_date_materializes_the_full_schedule() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.cycle_number, 1);
    assert_eq!(cycle.current_count, 8);
    assert_eq!(cycle.total_count, 8);
    assert_eq!(cycle.started_at, date(2026, 3, 2));

    let dates: Vec<NaiveDate> = cycle.sessions.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2026, 3, 2),
            date(2026, 3, 4),
            date(2026, 3, 9),
            date(2026, 3, 11),
            date(2026, 3, 16),
            date(2026, 3, 18),
            date(2026, 3, 23),
            date(2026, 3, 25),
        ]
    );
    assert!(cycle
        .sessions
        .iter()
        .all(|s| s.status == AttendanceStatus::Present && s.counts_toward_cycle));
}

#[test]
fn activation_without_start_date_stays_dormant() {
    let (mut service, group) = service_with_group();
    let student = register(&mut service, group, "Lee Student", EnrollmentStatus::Inquiry);

    service
        .change_status(student, EnrollmentStatus::Active, None, None)
        .unwrap();

    assert_eq!(
        service.ledger.student(student).unwrap().enrollment_status,
        EnrollmentStatus::Active
    );
    assert!(service.ledger.active_cycle(student).is_none());

    // The explicit verb starts it later.
    service.start_cycle(student, date(2026, 3, 2)).unwrap();
    assert!(service.ledger.active_cycle(student).is_some());
}

#[test]
fn at_most_one_cycle_in_progress() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);

    let err = service.start_cycle(student, date(2026, 4, 1)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::CycleAlreadyInProgress { cycle_number: 1, .. }
    ));

    let in_progress = service
        .ledger
        .cycles_of(student)
        .filter(|c| c.status == CycleStatus::InProgress)
        .count();
    assert_eq!(in_progress, 1);
}

// ---------------------------------------------------------------------------
// Enrollment transitions
// ---------------------------------------------------------------------------

#[test]
fn stopped_does_not_permit_level_test() {
    let (mut service, group) = service_with_group();
    let student = register(&mut service, group, "Park Student", EnrollmentStatus::Inquiry);

    service
        .change_status(student, EnrollmentStatus::Stopped, None, None)
        .unwrap();
    let err = service
        .change_status(student, EnrollmentStatus::LevelTest, None, None)
        .unwrap_err();

    match err {
        ServiceError::Enrollment(EnrollmentError::InvalidTransition { from, to }) => {
            assert_eq!(from, EnrollmentStatus::Stopped);
            assert_eq!(to, EnrollmentStatus::LevelTest);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    // Rejected transition leaves no history record behind.
    assert_eq!(service.ledger.student(student).unwrap().history.len(), 2);
}

#[test]
fn reactivation_numbers_the_next_cycle_past_the_highest() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let first_cycle = service.ledger.active_cycle(student).unwrap().id;

    service.complete_cycle(first_cycle).unwrap();
    let payment = service.ledger.payment_for_cycle(first_cycle).unwrap().id;
    service
        .confirm_payment(payment, PaymentMethod::Transfer, None)
        .unwrap();

    service
        .change_status(student, EnrollmentStatus::Stopped, None, None)
        .unwrap();
    service
        .change_status(
            student,
            EnrollmentStatus::Active,
            Some("re-enrolled".to_string()),
            Some(date(2026, 5, 4)),
        )
        .unwrap();

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.cycle_number, 2);
    assert_eq!(cycle.started_at, date(2026, 5, 4));
}

// ---------------------------------------------------------------------------
// Exceptions and schedule extension
// ---------------------------------------------------------------------------

#[test]
fn exception_update_extends_the_tail_and_holds_the_count() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let first = session_on(&service, student, date(2026, 3, 2));

    service.update_attendance(first, excused_change()).unwrap();

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.current_count, 8);
    assert_eq!(cycle.sessions.len(), 9);
    // Tail was 03-25; the next Monday after it is 03-30.
    assert_eq!(cycle.last_session_date(), Some(date(2026, 3, 30)));

    let row = cycle.session(first).unwrap();
    assert_eq!(row.status, AttendanceStatus::AbsentExcused);
    assert!(!row.counts_toward_cycle);
    assert_eq!(row.excuse_reason, Some(ExcuseReason::SickLeave));
}

#[test]
fn lateness_update_does_not_extend() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let first = session_on(&service, student, date(2026, 3, 2));

    service
        .update_attendance(
            first,
            AttendanceChange {
                status: AttendanceStatus::Late,
                counts_toward_cycle: true,
                excuse_reason: None,
                memo: Some("bus".to_string()),
            },
        )
        .unwrap();

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.current_count, 8);
    assert_eq!(cycle.sessions.len(), 8);
}

#[test]
fn creation_time_exception_does_not_extend() {
    // Only the update path extends; a row born as an exception leaves the
    // schedule alone.
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);

    service
        .record_attendance(
            student,
            date(2026, 3, 6),
            AttendanceStatus::AbsentExcused,
            false,
            Some(ExcuseReason::SchoolEvent),
            None,
        )
        .unwrap();

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.sessions.len(), 9);
    assert_eq!(cycle.current_count, 8);
    assert_eq!(cycle.last_session_date(), Some(date(2026, 3, 25)));
}

#[test]
fn count_tracks_every_create_update_delete() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);

    let extra = service
        .record_attendance(
            student,
            date(2026, 3, 27),
            AttendanceStatus::Present,
            true,
            None,
            None,
        )
        .unwrap();
    assert_eq!(service.ledger.active_cycle(student).unwrap().current_count, 9);

    service.update_attendance(extra, excused_change()).unwrap();
    // 9 countable - 1 exception + 1 extension = 9.
    assert_eq!(service.ledger.active_cycle(student).unwrap().current_count, 9);

    // Deleting the now non-counting row leaves the count alone.
    service.delete_attendance(extra).unwrap();
    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.current_count, 9);
    assert_eq!(cycle.sessions.len(), 9);
}

#[test]
fn deleting_a_countable_row_lowers_the_count() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let first = session_on(&service, student, date(2026, 3, 2));

    service.delete_attendance(first).unwrap();

    let cycle = service.ledger.active_cycle(student).unwrap();
    assert_eq!(cycle.current_count, 7);
    assert_eq!(cycle.sessions.len(), 7);

    let err = service.delete_attendance(first).unwrap_err();
    assert!(matches!(err, ServiceError::AttendanceNotFound(_)));
}

// ---------------------------------------------------------------------------
// Completion and billing
// ---------------------------------------------------------------------------

#[test]
fn completion_issues_exactly_one_pending_invoice() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;

    service.complete_cycle(cycle_id).unwrap();

    let payment = service.ledger.payment_for_cycle(cycle_id).unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    // Default elementary rate, no override.
    assert_eq!(payment.amount, 180_000);
    assert_eq!(service.ledger.payments.len(), 1);

    let err = service.complete_cycle(cycle_id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Cycle(CycleError::AlreadyCompleted)
    ));
    assert_eq!(service.ledger.payments.len(), 1);
}

#[test]
fn completion_requires_the_full_count() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;
    let first = session_on(&service, student, date(2026, 3, 2));

    service.delete_attendance(first).unwrap();
    let err = service.complete_cycle(cycle_id).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Cycle(CycleError::Incomplete { current: 7, total: 8 })
    ));
    assert!(service.ledger.payment_for_cycle(cycle_id).is_none());
}

#[test]
fn completed_cycle_rows_cannot_be_edited() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;
    let first = session_on(&service, student, date(2026, 3, 2));

    service.complete_cycle(cycle_id).unwrap();

    assert!(matches!(
        service.update_attendance(first, excused_change()),
        Err(ServiceError::Cycle(CycleError::AlreadyCompleted))
    ));
    assert!(matches!(
        service.delete_attendance(first),
        Err(ServiceError::Cycle(CycleError::AlreadyCompleted))
    ));
    assert_eq!(service.ledger.cycle(cycle_id).unwrap().current_count, 8);
}

#[test]
fn ensure_payment_is_idempotent() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;

    let first = service.ensure_payment(student, cycle_id).unwrap();
    let second = service.ensure_payment(student, cycle_id).unwrap();
    assert_eq!(first, second);
    assert_eq!(service.ledger.payments.len(), 1);
}

#[test]
fn tuition_override_drives_the_invoice_amount() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    service.ledger.student_mut(student).unwrap().tuition_override = Some(150_000);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;

    service.complete_cycle(cycle_id).unwrap();
    assert_eq!(
        service.ledger.payment_for_cycle(cycle_id).unwrap().amount,
        150_000
    );
    assert_eq!(service.effective_tuition(student).unwrap(), 150_000);
}

#[test]
fn confirm_payment_once() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;
    service.complete_cycle(cycle_id).unwrap();
    let payment = service.ledger.payment_for_cycle(cycle_id).unwrap().id;

    service
        .confirm_payment(payment, PaymentMethod::Cash, Some("March".to_string()))
        .unwrap();
    let confirmed = service.ledger.payment(payment).unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Paid);
    assert_eq!(confirmed.payment_method, Some(PaymentMethod::Cash));
    assert!(confirmed.paid_at.is_some());

    let err = service
        .confirm_payment(payment, PaymentMethod::Transfer, None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Billing(_)));
}

#[test]
fn notice_marks_message_sent_and_embeds_the_amount() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;
    service.complete_cycle(cycle_id).unwrap();
    let payment = service.ledger.payment_for_cycle(cycle_id).unwrap().id;

    let text = service.compose_notice(payment).unwrap();
    assert!(text.contains("Kim Student (Elementary)"));
    assert!(text.contains("cycle 1 (8 sessions)"));
    assert!(text.contains("180,000 won"));

    let sent = service.ledger.payment(payment).unwrap();
    assert!(sent.message_sent);
    assert!(sent.message_sent_at.is_some());
    assert_eq!(sent.status, PaymentStatus::Pending);
}

// ---------------------------------------------------------------------------
// The cross-cycle payment gate
// ---------------------------------------------------------------------------

#[test]
fn next_cycle_waits_for_the_prior_invoice() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let first_cycle = service.ledger.active_cycle(student).unwrap().id;

    service.complete_cycle(first_cycle).unwrap();

    let err = service.start_cycle(student, date(2026, 4, 6)).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::PriorCycleUnpaid { cycle_number: 1, .. }
    ));

    let payment = service.ledger.payment_for_cycle(first_cycle).unwrap().id;
    service
        .confirm_payment(payment, PaymentMethod::Transfer, None)
        .unwrap();

    let second = service.start_cycle(student, date(2026, 4, 6)).unwrap();
    let cycle = service.ledger.cycle(second).unwrap();
    assert_eq!(cycle.cycle_number, 2);
    assert_eq!(cycle.current_count, 8);
}

// ---------------------------------------------------------------------------
// Rosters and alerts
// ---------------------------------------------------------------------------

#[test]
fn default_roster_hides_stopped_students() {
    let (mut service, group) = service_with_group();
    let inquiring = register(&mut service, group, "Ahn Inquiry", EnrollmentStatus::Inquiry);
    let stopped = register(&mut service, group, "Bae Stopped", EnrollmentStatus::Active);
    service
        .change_status(stopped, EnrollmentStatus::Stopped, None, None)
        .unwrap();

    let default_view = service.list_students(None, StatusFilter::default());
    assert_eq!(default_view.len(), 1);
    assert_eq!(default_view[0].id, inquiring);

    assert_eq!(service.list_students(None, StatusFilter::All).len(), 2);
    assert_eq!(
        service
            .list_students(None, StatusFilter::Only(EnrollmentStatus::Stopped))
            .len(),
        1
    );
}

#[test]
fn alerts_list_full_cycles_fullest_first() {
    let (mut service, group) = service_with_group();
    let full = active_student(&mut service, group);

    let partial = register(&mut service, group, "Cho Partial", EnrollmentStatus::LevelTest);
    service
        .change_status(
            partial,
            EnrollmentStatus::Active,
            None,
            Some(date(2026, 3, 2)),
        )
        .unwrap();
    let row = session_on(&service, partial, date(2026, 3, 2));
    // Drop one countable row without extension: delete, leaving 7.
    service.delete_attendance(row).unwrap();

    let alerts = service.cycle_alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].student_id, full);
    assert_eq!(alerts[0].current_count, 8);
    assert_eq!(alerts[1].student_id, partial);
    assert_eq!(alerts[1].current_count, 7);
    assert_eq!(alerts[1].class_group_name, "Mon/Wed A");
}

#[test]
fn deactivating_a_group_leaves_schedules_alone() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);

    service.deactivate_class_group(group).unwrap();

    assert!(!service.ledger.class_group(group).unwrap().is_active);
    assert_eq!(service.ledger.active_cycle(student).unwrap().current_count, 8);

    let err = service
        .add_class_group(
            "Mon/Wed A",
            WeekdaySet::new([Weekday::Mon]).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            60,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateClassGroupName(_)));
}

#[test]
fn daily_roll_call_filters_by_group_and_date() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let other_group = service
        .add_class_group(
            "Tue/Thu B",
            WeekdaySet::new([Weekday::Tue, Weekday::Thu]).unwrap(),
            NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
            120,
            None,
        )
        .unwrap();

    let rows = service.daily_attendance(date(2026, 3, 2), None);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].student_id, student);

    assert!(service
        .daily_attendance(date(2026, 3, 2), Some(other_group))
        .is_empty());
    assert!(service.daily_attendance(date(2026, 3, 3), None).is_empty());
}

// ---------------------------------------------------------------------------
// Missing-entity contracts
// ---------------------------------------------------------------------------

#[test]
fn verbs_report_missing_entities() {
    let (mut service, _group) = service_with_group();
    let ghost = StudentId::new();

    assert!(matches!(
        service.change_status(ghost, EnrollmentStatus::Active, None, None),
        Err(ServiceError::StudentNotFound(_))
    ));
    assert!(matches!(
        service.start_cycle(ghost, date(2026, 3, 2)),
        Err(ServiceError::StudentNotFound(_))
    ));
    assert!(matches!(
        service.record_attendance(
            ghost,
            date(2026, 3, 2),
            AttendanceStatus::Present,
            true,
            None,
            None
        ),
        Err(ServiceError::StudentNotFound(_))
    ));
    assert!(matches!(
        service.update_attendance(AttendanceId::new(), excused_change()),
        Err(ServiceError::AttendanceNotFound(_))
    ));
    assert!(matches!(
        service.confirm_payment(cram_core::PaymentId::new(), PaymentMethod::Cash, None),
        Err(ServiceError::PaymentNotFound(_))
    ));
    assert!(matches!(
        service.complete_cycle(cram_core::CycleId::new()),
        Err(ServiceError::CycleNotFound(_))
    ));
}

#[test]
fn attendance_requires_an_active_cycle() {
    let (mut service, group) = service_with_group();
    let student = register(&mut service, group, "Dormant", EnrollmentStatus::Active);

    let err = service
        .record_attendance(
            student,
            date(2026, 3, 2),
            AttendanceStatus::Present,
            true,
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::NoActiveCycle(_)));
}

#[test]
fn ledger_round_trips_through_json() {
    let (mut service, group) = service_with_group();
    let student = active_student(&mut service, group);
    let cycle_id = service.ledger.active_cycle(student).unwrap().id;
    service.complete_cycle(cycle_id).unwrap();

    let json = serde_json::to_string_pretty(&service).unwrap();
    let restored: StudioService = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.ledger.students.len(), 1);
    let cycle = restored.ledger.cycle(cycle_id).unwrap();
    assert_eq!(cycle.status, CycleStatus::Completed);
    assert_eq!(cycle.current_count, 8);
    assert!(restored.ledger.payment_for_cycle(cycle_id).is_some());
}
