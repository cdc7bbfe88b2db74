//! # Attendance Scheduler
//!
//! Materializes a cycle's placeholder rows from a class's weekly meeting
//! pattern, and pushes the schedule's tail outward one session at a time
//! when exceptions free up capacity.
//!
//! The date arithmetic lives in [`cram_core::calendar`] as a pure scan;
//! this module owns only the row materialization. Both entry points take
//! the weekday set as an argument — schedules are derived from the set the
//! caller resolved *now*, never from a stored copy.

use chrono::NaiveDate;
use thiserror::Error;

use cram_core::{next_matching_date, next_matching_dates, CalendarError, WeekdaySet};

use crate::cycle::{Attendance, Cycle};

/// Errors from schedule materialization.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The calendar scan could not collect the requested dates.
    #[error("schedule unresolvable: {0}")]
    Unresolvable(#[from] CalendarError),

    /// The cycle already carries a schedule.
    #[error("cycle already has {0} scheduled sessions")]
    AlreadyScheduled(usize),

    /// Completed cycles are frozen; their schedules never change.
    #[error("cycle is not in progress")]
    NotInProgress,

    /// Extension needs an existing tail to extend past.
    #[error("cycle has no scheduled sessions to extend")]
    EmptySchedule,
}

/// Fill a fresh cycle with its full block of placeholder sessions.
///
/// Walks the calendar forward from `start_date` (inclusive) and creates
/// one `present / counts_toward_cycle = true` row per matching date until
/// the cycle's `total_count` dates are placed, in chronological order.
/// On return the cycle is fully allocated: `current_count == total_count`.
///
/// # Errors
///
/// - [`ScheduleError::AlreadyScheduled`] if the cycle has any rows.
/// - [`ScheduleError::NotInProgress`] on a completed cycle.
/// - [`ScheduleError::Unresolvable`] if the scan hits its horizon.
///
/// No rows are created on any error path.
pub fn generate_schedule(
    cycle: &mut Cycle,
    weekdays: &WeekdaySet,
    start_date: NaiveDate,
) -> Result<(), ScheduleError> {
    if !cycle.is_in_progress() {
        return Err(ScheduleError::NotInProgress);
    }
    if !cycle.sessions.is_empty() {
        return Err(ScheduleError::AlreadyScheduled(cycle.sessions.len()));
    }

    let dates = next_matching_dates(start_date, weekdays, cycle.total_count as usize)?;
    for date in dates {
        cycle.push_session(Attendance::placeholder(cycle.student_id, date));
    }
    Ok(())
}

/// Append exactly one placeholder session past the schedule's tail.
///
/// Invoked when an existing row stops counting toward an in-progress
/// cycle: the freed capacity is re-committed on the next class date after
/// the current maximum, keeping the countable schedule at a constant
/// `total_count` however many exceptions occur.
///
/// Returns the appended date.
///
/// # Errors
///
/// - [`ScheduleError::NotInProgress`] on a completed cycle.
/// - [`ScheduleError::EmptySchedule`] if the cycle has no rows.
/// - [`ScheduleError::Unresolvable`] if the scan hits its horizon.
pub fn extend_schedule(cycle: &mut Cycle, weekdays: &WeekdaySet) -> Result<NaiveDate, ScheduleError> {
    if !cycle.is_in_progress() {
        return Err(ScheduleError::NotInProgress);
    }
    let tail = cycle.last_session_date().ok_or(ScheduleError::EmptySchedule)?;
    let date = next_matching_date(tail, weekdays)?;
    cycle.push_session(Attendance::placeholder(cycle.student_id, date));
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cram_core::{CycleId, StudentId, Weekday};

    use crate::cycle::{AttendanceChange, AttendanceStatus, ExcuseReason};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mon_wed() -> WeekdaySet {
        WeekdaySet::new([Weekday::Mon, Weekday::Wed]).unwrap()
    }

    fn fresh_cycle() -> Cycle {
        Cycle::new(CycleId::new(), StudentId::new(), 1, date(2026, 3, 2))
    }

    #[test]
    fn generate_places_the_full_block() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();

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
        assert_eq!(cycle.current_count, 8);
        assert!(cycle
            .sessions
            .iter()
            .all(|s| s.status == AttendanceStatus::Present && s.counts_toward_cycle));
    }

    #[test]
    fn generate_twice_fails_without_touching_rows() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();
        let err = generate_schedule(&mut cycle, &mon_wed(), date(2026, 4, 1)).unwrap_err();
        assert!(matches!(err, ScheduleError::AlreadyScheduled(8)));
        assert_eq!(cycle.sessions.len(), 8);
    }

    #[test]
    fn extend_appends_one_past_the_tail() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();

        let appended = extend_schedule(&mut cycle, &mon_wed()).unwrap();
        assert_eq!(appended, date(2026, 3, 30));
        assert_eq!(cycle.sessions.len(), 9);
        assert_eq!(cycle.last_session_date(), Some(date(2026, 3, 30)));
    }

    #[test]
    fn exception_plus_extension_holds_count_at_eight() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();

        let first = cycle.sessions[0].id;
        let update = cycle
            .update_session(
                first,
                AttendanceChange {
                    status: AttendanceStatus::AbsentExcused,
                    counts_toward_cycle: false,
                    excuse_reason: Some(ExcuseReason::SickLeave),
                    memo: None,
                },
            )
            .unwrap();
        assert!(update.stopped_counting());
        assert_eq!(cycle.current_count, 7);

        extend_schedule(&mut cycle, &mon_wed()).unwrap();
        assert_eq!(cycle.current_count, 8);
        assert_eq!(cycle.sessions.len(), 9);
    }

    #[test]
    fn repeated_exceptions_keep_pushing_the_tail() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();

        // Two exceptions, two extensions: 2026-03-30 then 2026-04-01.
        for index in [0usize, 1] {
            let id = cycle.sessions[index].id;
            cycle
                .update_session(
                    id,
                    AttendanceChange {
                        status: AttendanceStatus::AbsentExcused,
                        counts_toward_cycle: false,
                        excuse_reason: Some(ExcuseReason::ClassCancelled),
                        memo: None,
                    },
                )
                .unwrap();
            extend_schedule(&mut cycle, &mon_wed()).unwrap();
        }

        assert_eq!(cycle.current_count, 8);
        assert_eq!(cycle.last_session_date(), Some(date(2026, 4, 1)));
    }

    #[test]
    fn extend_rejects_completed_cycle() {
        let mut cycle = fresh_cycle();
        generate_schedule(&mut cycle, &mon_wed(), date(2026, 3, 2)).unwrap();
        cycle.complete(date(2026, 3, 25)).unwrap();

        assert!(matches!(
            extend_schedule(&mut cycle, &mon_wed()),
            Err(ScheduleError::NotInProgress)
        ));
    }

    #[test]
    fn extend_rejects_empty_cycle() {
        let mut cycle = fresh_cycle();
        assert!(matches!(
            extend_schedule(&mut cycle, &mon_wed()),
            Err(ScheduleError::EmptySchedule)
        ));
    }
}
