//! # Studio Service
//!
//! The verb-shaped administrative interface over the [`Ledger`]. This is
//! the orchestration layer: each verb validates its preconditions against
//! loaded state, then commits every mutation for the call together. The
//! cross-machine side effects live here and only here —
//!
//! - activation with a start date starts a cycle,
//! - an exception on an in-progress cycle extends its schedule,
//! - completion issues the tuition invoice,
//! - a new cycle requires the predecessor's invoice to be paid.
//!
//! ## Atomicity
//!
//! Single-actor, synchronous, no suspension points. Every verb stages its
//! fallible work (lookups, transition checks, schedule scans) before the
//! first mutation, so a failed call leaves the ledger untouched. The one
//! in-flight fallible step after a mutation is schedule extension, whose
//! preconditions (in-progress cycle, non-empty schedule, non-empty weekday
//! set) are all validated beforehand.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use cram_core::{
    AttendanceId, ClassGroupId, CycleId, PaymentId, StudentId, Timestamp, TuitionTable,
    WeekdaySet,
};
use cram_state::{
    extend_schedule, generate_schedule, Attendance, AttendanceChange, AttendanceStatus,
    ClassGroup, Cycle, CycleStatus, EnrollmentError, EnrollmentStatus, ExcuseReason, Payment,
    PaymentMethod, PaymentStatus, Student, StudentProfile, TuitionNotice,
};

use crate::error::ServiceError;
use crate::store::Ledger;

// ── Query vocabulary ───────────────────────────────────────────────────

/// Enrollment-status filter for student listings.
///
/// The default view hides stopped students, matching the administrator's
/// day-to-day roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Everyone except `stopped`.
    #[default]
    ExcludeStopped,
    /// Everyone.
    All,
    /// Exactly one status.
    Only(EnrollmentStatus),
}

impl StatusFilter {
    fn admits(&self, status: EnrollmentStatus) -> bool {
        match self {
            Self::ExcludeStopped => status != EnrollmentStatus::Stopped,
            Self::All => true,
            Self::Only(wanted) => status == *wanted,
        }
    }
}

/// A cycle nearing or past its full count — the "collect tuition soon"
/// view.
#[derive(Debug, Clone, Serialize)]
pub struct CycleAlert {
    /// The student.
    pub student_id: StudentId,
    /// Student name, for display.
    pub student_name: String,
    /// The student's class group name, for display.
    pub class_group_name: String,
    /// The cycle.
    pub cycle_id: CycleId,
    /// Position in the student's sequence.
    pub cycle_number: u32,
    /// Countable sessions on the books.
    pub current_count: u32,
    /// Sessions in the block.
    pub total_count: u32,
    /// Cycle state.
    pub status: CycleStatus,
}

// ── Service ────────────────────────────────────────────────────────────

/// The studio's administrative service: one ledger, one tuition table,
/// one actor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioService {
    /// All studio state.
    pub ledger: Ledger,
    /// Tuition configuration.
    pub tuition: TuitionTable,
}

impl StudioService {
    /// A service over an empty ledger with the given tuition table.
    pub fn new(tuition: TuitionTable) -> Self {
        Self {
            ledger: Ledger::new(),
            tuition,
        }
    }

    // ── Class groups ───────────────────────────────────────────────────

    /// Create a class group.
    ///
    /// # Errors
    ///
    /// [`ServiceError::DuplicateClassGroupName`] if the name is taken;
    /// [`ServiceError::ClassGroup`] if the name is blank.
    pub fn add_class_group(
        &mut self,
        name: &str,
        weekdays: WeekdaySet,
        start_time: NaiveTime,
        default_duration_minutes: u32,
        memo: Option<String>,
    ) -> Result<ClassGroupId, ServiceError> {
        if self.ledger.class_group_by_name(name).is_some() {
            return Err(ServiceError::DuplicateClassGroupName(name.to_string()));
        }
        let group = ClassGroup::new(
            ClassGroupId::new(),
            name,
            weekdays,
            start_time,
            default_duration_minutes,
            memo,
        )?;
        let id = group.id;
        tracing::info!(class_group = %id, name = %group.name, days = %group.weekdays, "class group created");
        self.ledger.class_groups.insert(id, group);
        Ok(id)
    }

    /// Stop a class group from accepting students. Existing students and
    /// their schedules are untouched.
    pub fn deactivate_class_group(&mut self, id: ClassGroupId) -> Result<(), ServiceError> {
        let group = self
            .ledger
            .class_groups
            .get_mut(&id)
            .ok_or(ServiceError::ClassGroupNotFound(id))?;
        group.deactivate();
        tracing::info!(class_group = %id, name = %group.name, "class group deactivated");
        Ok(())
    }

    // ── Students ───────────────────────────────────────────────────────

    /// Register a student in the given initial status.
    ///
    /// The registration history record is written atomically with the
    /// student.
    ///
    /// # Errors
    ///
    /// [`ServiceError::ClassGroupNotFound`] if the assigned group does not
    /// exist.
    pub fn register_student(
        &mut self,
        profile: StudentProfile,
        initial: EnrollmentStatus,
    ) -> Result<StudentId, ServiceError> {
        if self.ledger.class_group(profile.class_group_id).is_none() {
            return Err(ServiceError::ClassGroupNotFound(profile.class_group_id));
        }
        let id = StudentId::new();
        let student = Student::register(id, profile, initial);
        tracing::info!(student = %id, name = %student.name, status = %initial, "student registered");
        self.ledger.students.insert(id, student);
        Ok(id)
    }

    /// Change a student's enrollment status along an allowed edge.
    ///
    /// If the target is `active`, a `start_date` is supplied, and the
    /// student has no cycle in progress, a new cycle is started on that
    /// date. With no `start_date` the status changes and billing stays
    /// dormant — activation and cycle start are deliberately decoupled.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StudentNotFound`], [`ServiceError::Enrollment`]
    /// (invalid transition), or the cycle-preparation errors when a start
    /// date is supplied. On any error the status does not change.
    pub fn change_status(
        &mut self,
        student_id: StudentId,
        target: EnrollmentStatus,
        memo: Option<String>,
        start_date: Option<NaiveDate>,
    ) -> Result<(), ServiceError> {
        let student = self
            .ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let from = student.enrollment_status;
        if !from.can_transition(target) {
            return Err(EnrollmentError::InvalidTransition { from, to: target }.into());
        }

        // Stage the cycle before mutating anything: schedule generation
        // can fail, the status change afterwards cannot.
        let new_cycle = match (target, start_date) {
            (EnrollmentStatus::Active, Some(start))
                if self.ledger.active_cycle(student_id).is_none() =>
            {
                Some(self.prepare_cycle(student_id, start)?)
            }
            _ => None,
        };

        let student = self
            .ledger
            .student_mut(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        student.change_status(target, memo)?;
        tracing::info!(student = %student_id, from = %from, to = %target, "enrollment status changed");

        if let Some(cycle) = new_cycle {
            tracing::info!(
                student = %student_id,
                cycle = %cycle.id,
                number = cycle.cycle_number,
                start = %cycle.started_at,
                "cycle started on activation"
            );
            self.ledger.cycles.insert(cycle.id, cycle);
        }
        Ok(())
    }

    /// Update a student's level-test bookkeeping.
    pub fn update_level_test(
        &mut self,
        student_id: StudentId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        result: Option<String>,
    ) -> Result<(), ServiceError> {
        let student = self
            .ledger
            .student_mut(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        student.update_level_test(date, time, result);
        Ok(())
    }

    /// Students visible under the given filters, sorted by name.
    pub fn list_students(
        &self,
        class_group: Option<ClassGroupId>,
        filter: StatusFilter,
    ) -> Vec<&Student> {
        let mut students: Vec<&Student> = self
            .ledger
            .students
            .values()
            .filter(|s| filter.admits(s.enrollment_status))
            .filter(|s| class_group.map_or(true, |g| s.class_group_id == g))
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        students
    }

    /// The tuition a student is billed per cycle.
    pub fn effective_tuition(&self, student_id: StudentId) -> Result<i64, ServiceError> {
        let student = self
            .ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        Ok(student.effective_tuition(&self.tuition))
    }

    // ── Cycles ─────────────────────────────────────────────────────────

    /// Start the student's next cycle on `start_date`.
    ///
    /// The cycle is created fully allocated: its 8 placeholder sessions
    /// are materialized from the student's class weekday set before
    /// anything is committed.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::StudentNotFound`] /
    ///   [`ServiceError::ClassGroupNotFound`] for unresolvable owners.
    /// - [`ServiceError::CycleAlreadyInProgress`] — at most one in-progress
    ///   cycle per student.
    /// - [`ServiceError::PriorCycleUnpaid`] — the cross-cycle payment
    ///   gate: the most recent completed cycle must have a paid invoice.
    /// - [`ServiceError::Schedule`] if the calendar scan cannot resolve.
    pub fn start_cycle(
        &mut self,
        student_id: StudentId,
        start_date: NaiveDate,
    ) -> Result<CycleId, ServiceError> {
        self.ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        if let Some(active) = self.ledger.active_cycle(student_id) {
            return Err(ServiceError::CycleAlreadyInProgress {
                student_id,
                cycle_number: active.cycle_number,
            });
        }
        if let Some(prior) = self.ledger.latest_completed_cycle(student_id) {
            let paid = self
                .ledger
                .payment_for_cycle(prior.id)
                .map(|p| p.status == PaymentStatus::Paid)
                .unwrap_or(false);
            if !paid {
                return Err(ServiceError::PriorCycleUnpaid {
                    cycle_id: prior.id,
                    cycle_number: prior.cycle_number,
                });
            }
        }

        let cycle = self.prepare_cycle(student_id, start_date)?;
        let id = cycle.id;
        tracing::info!(
            student = %student_id,
            cycle = %id,
            number = cycle.cycle_number,
            start = %start_date,
            "cycle started"
        );
        self.ledger.cycles.insert(id, cycle);
        Ok(id)
    }

    /// Mark a cycle completed and issue its invoice.
    ///
    /// Completion is administrator-invoked: the count reaching 8 never
    /// completes a cycle on its own, because the 8th scheduled date may
    /// still be in the future.
    ///
    /// # Errors
    ///
    /// [`ServiceError::CycleNotFound`], [`ServiceError::Cycle`] with
    /// [`cram_state::CycleError::Incomplete`] or
    /// [`cram_state::CycleError::AlreadyCompleted`].
    pub fn complete_cycle(&mut self, cycle_id: CycleId) -> Result<(), ServiceError> {
        let cycle = self
            .ledger
            .cycle(cycle_id)
            .ok_or(ServiceError::CycleNotFound(cycle_id))?;
        let student_id = cycle.student_id;
        // Invoice issuance must not be able to fail after completion
        // commits, so resolve the student first.
        self.ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;

        let today = Utc::now().date_naive();
        let cycle = self
            .ledger
            .cycle_mut(cycle_id)
            .ok_or(ServiceError::CycleNotFound(cycle_id))?;
        cycle.complete(today)?;
        let cycle_number = cycle.cycle_number;
        tracing::info!(cycle = %cycle_id, student = %student_id, number = cycle_number, "cycle completed");

        self.ensure_payment(student_id, cycle_id)?;
        Ok(())
    }

    // ── Attendance ─────────────────────────────────────────────────────

    /// Record an ad-hoc attendance row against the student's in-progress
    /// cycle.
    ///
    /// Exception rows created here do *not* extend the schedule; only the
    /// update path does.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StudentNotFound`],
    /// [`ServiceError::NoActiveCycle`] when nothing is in progress.
    pub fn record_attendance(
        &mut self,
        student_id: StudentId,
        date: NaiveDate,
        status: AttendanceStatus,
        counts_toward_cycle: bool,
        excuse_reason: Option<ExcuseReason>,
        memo: Option<String>,
    ) -> Result<AttendanceId, ServiceError> {
        self.ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let cycle_id = self
            .ledger
            .active_cycle(student_id)
            .ok_or(ServiceError::NoActiveCycle(student_id))?
            .id;
        let cycle = self
            .ledger
            .cycle_mut(cycle_id)
            .ok_or(ServiceError::CycleNotFound(cycle_id))?;

        let id = cycle.push_session(Attendance {
            id: AttendanceId::new(),
            student_id,
            date,
            status,
            counts_toward_cycle,
            excuse_reason,
            memo,
            recorded_at: Timestamp::now(),
        });
        tracing::debug!(
            student = %student_id,
            cycle = %cycle_id,
            date = %date,
            count = cycle.current_count,
            "attendance recorded"
        );
        Ok(id)
    }

    /// Update an attendance row.
    ///
    /// When the row's `counts_toward_cycle` transitions true → false
    /// inside an in-progress cycle, the schedule is extended by exactly
    /// one session past its tail, keeping committed countable capacity at
    /// the cycle's total.
    ///
    /// # Errors
    ///
    /// [`ServiceError::AttendanceNotFound`] if no cycle owns the row.
    pub fn update_attendance(
        &mut self,
        attendance_id: AttendanceId,
        change: AttendanceChange,
    ) -> Result<(), ServiceError> {
        let (cycle_id, student_id, was_counting, in_progress) = {
            let cycle = self
                .ledger
                .cycle_owning(attendance_id)
                .ok_or(ServiceError::AttendanceNotFound(attendance_id))?;
            let row = cycle
                .session(attendance_id)
                .ok_or(ServiceError::AttendanceNotFound(attendance_id))?;
            (
                cycle.id,
                cycle.student_id,
                row.counts_toward_cycle,
                cycle.is_in_progress(),
            )
        };

        // Resolve the weekday set up front when this update will free
        // capacity; after the row mutates, extension must not fail.
        let stops = was_counting && !change.counts_toward_cycle && in_progress;
        let weekdays = if stops {
            let student = self
                .ledger
                .student(student_id)
                .ok_or(ServiceError::StudentNotFound(student_id))?;
            let group = self
                .ledger
                .class_group(student.class_group_id)
                .ok_or(ServiceError::ClassGroupNotFound(student.class_group_id))?;
            Some(group.weekdays.clone())
        } else {
            None
        };

        let cycle = self
            .ledger
            .cycle_mut(cycle_id)
            .ok_or(ServiceError::CycleNotFound(cycle_id))?;
        let update = cycle.update_session(attendance_id, change)?;

        if update.stopped_counting() {
            if let Some(weekdays) = weekdays {
                let appended = extend_schedule(cycle, &weekdays)?;
                tracing::debug!(
                    cycle = %cycle_id,
                    date = %appended,
                    "schedule extended after exception"
                );
            }
        }
        tracing::debug!(
            cycle = %cycle_id,
            attendance = %attendance_id,
            count = self.ledger.cycle(cycle_id).map(|c| c.current_count).unwrap_or(0),
            "attendance updated"
        );
        Ok(())
    }

    /// Delete an attendance row.
    ///
    /// # Errors
    ///
    /// [`ServiceError::AttendanceNotFound`] if no cycle owns the row.
    pub fn delete_attendance(&mut self, attendance_id: AttendanceId) -> Result<(), ServiceError> {
        let cycle_id = self
            .ledger
            .cycle_owning(attendance_id)
            .ok_or(ServiceError::AttendanceNotFound(attendance_id))?
            .id;
        let cycle = self
            .ledger
            .cycle_mut(cycle_id)
            .ok_or(ServiceError::CycleNotFound(cycle_id))?;
        cycle.remove_session(attendance_id)?;
        tracing::debug!(
            cycle = %cycle_id,
            attendance = %attendance_id,
            count = cycle.current_count,
            "attendance deleted"
        );
        Ok(())
    }

    /// Attendance rows on a date, optionally restricted to one class
    /// group, ordered by student name.
    pub fn daily_attendance(
        &self,
        date: NaiveDate,
        class_group: Option<ClassGroupId>,
    ) -> Vec<&Attendance> {
        let mut rows: Vec<&Attendance> = self
            .ledger
            .cycles
            .values()
            .flat_map(|c| c.sessions.iter())
            .filter(|row| row.date == date)
            .filter(|row| {
                class_group.map_or(true, |g| {
                    self.ledger
                        .student(row.student_id)
                        .map_or(false, |s| s.class_group_id == g)
                })
            })
            .collect();
        rows.sort_by_key(|row| {
            self.ledger
                .student(row.student_id)
                .map(|s| s.name.clone())
                .unwrap_or_default()
        });
        rows
    }

    /// Cycles within one session of their full count, for active
    /// students, fullest first.
    pub fn cycle_alerts(&self) -> Vec<CycleAlert> {
        let mut alerts: Vec<CycleAlert> = self
            .ledger
            .cycles
            .values()
            .filter(|c| c.current_count + 1 >= c.total_count)
            .filter_map(|c| {
                let student = self.ledger.student(c.student_id)?;
                if student.enrollment_status == EnrollmentStatus::Stopped {
                    return None;
                }
                let class_group_name = self
                    .ledger
                    .class_group(student.class_group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_default();
                Some(CycleAlert {
                    student_id: student.id,
                    student_name: student.name.clone(),
                    class_group_name,
                    cycle_id: c.id,
                    cycle_number: c.cycle_number,
                    current_count: c.current_count,
                    total_count: c.total_count,
                    status: c.status,
                })
            })
            .collect();
        alerts.sort_by(|a, b| b.current_count.cmp(&a.current_count));
        alerts
    }

    // ── Billing ────────────────────────────────────────────────────────

    /// Issue the invoice for a completed cycle if one does not already
    /// exist. Idempotent on the `(student, cycle)` pair.
    ///
    /// # Errors
    ///
    /// [`ServiceError::StudentNotFound`] if the student cannot be
    /// resolved for amount lookup.
    pub fn ensure_payment(
        &mut self,
        student_id: StudentId,
        cycle_id: CycleId,
    ) -> Result<PaymentId, ServiceError> {
        if let Some(existing) = self
            .ledger
            .payments
            .values()
            .find(|p| p.student_id == student_id && p.cycle_id == cycle_id)
        {
            return Ok(existing.id);
        }
        let student = self
            .ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let amount = student.effective_tuition(&self.tuition);
        let payment = Payment::pending(PaymentId::new(), student_id, cycle_id, amount);
        let id = payment.id;
        tracing::info!(
            payment = %id,
            student = %student_id,
            cycle = %cycle_id,
            amount,
            "invoice issued"
        );
        self.ledger.payments.insert(id, payment);
        Ok(id)
    }

    /// Confirm receipt of a tuition payment.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PaymentNotFound`], [`ServiceError::Billing`] with
    /// [`cram_state::BillingError::AlreadyPaid`].
    pub fn confirm_payment(
        &mut self,
        payment_id: PaymentId,
        method: PaymentMethod,
        memo: Option<String>,
    ) -> Result<(), ServiceError> {
        let payment = self
            .ledger
            .payment_mut(payment_id)
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;
        payment.confirm(method, memo)?;
        tracing::info!(payment = %payment_id, method = %method, "payment confirmed");
        Ok(())
    }

    /// Render the guardian-facing tuition notice for a payment and mark
    /// the message sent.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PaymentNotFound`] and the owner-resolution errors.
    pub fn compose_notice(&mut self, payment_id: PaymentId) -> Result<String, ServiceError> {
        let payment = self
            .ledger
            .payment(payment_id)
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;
        let student = self
            .ledger
            .student(payment.student_id)
            .ok_or(ServiceError::StudentNotFound(payment.student_id))?;
        let cycle = self
            .ledger
            .cycle(payment.cycle_id)
            .ok_or(ServiceError::CycleNotFound(payment.cycle_id))?;

        let notice = TuitionNotice {
            student_name: student.name.clone(),
            grade_label: self.tuition.label_for(student.grade).to_string(),
            cycle_number: cycle.cycle_number,
            total_sessions: cycle.total_count,
            amount: payment.amount,
        };
        let text = notice.render();

        let payment = self
            .ledger
            .payment_mut(payment_id)
            .ok_or(ServiceError::PaymentNotFound(payment_id))?;
        payment.mark_message_sent();
        tracing::debug!(payment = %payment_id, "tuition notice composed");
        Ok(text)
    }

    /// Payments, optionally filtered by status, newest first.
    pub fn list_payments(&self, status: Option<PaymentStatus>) -> Vec<&Payment> {
        let mut payments: Vec<&Payment> = self
            .ledger
            .payments
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        payments
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Build the student's next cycle, fully scheduled, without touching
    /// the ledger.
    fn prepare_cycle(
        &self,
        student_id: StudentId,
        start_date: NaiveDate,
    ) -> Result<Cycle, ServiceError> {
        let student = self
            .ledger
            .student(student_id)
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let group = self
            .ledger
            .class_group(student.class_group_id)
            .ok_or(ServiceError::ClassGroupNotFound(student.class_group_id))?;
        let number = self.ledger.max_cycle_number(student_id) + 1;
        let mut cycle = Cycle::new(CycleId::new(), student_id, number, start_date);
        generate_schedule(&mut cycle, &group.weekdays, start_date)?;
        Ok(cycle)
    }
}
