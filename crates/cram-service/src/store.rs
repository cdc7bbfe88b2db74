//! # In-Memory Ledger
//!
//! The studio's entire persisted state as one serde-able value: class
//! groups, students (each owning its enrollment history), cycles (each
//! owning its attendance rows), and payments.
//!
//! Ordered maps keyed by the identifier newtypes keep the serialized form
//! stable. Lookups that cross ownership lines (which cycle owns this
//! attendance row, which payment bills this cycle) are linear scans — the
//! ledger holds one studio's worth of rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cram_core::{AttendanceId, ClassGroupId, CycleId, PaymentId, StudentId};
use cram_state::{ClassGroup, Cycle, CycleStatus, Payment, Student};

/// All studio state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Class groups by identifier.
    pub class_groups: BTreeMap<ClassGroupId, ClassGroup>,
    /// Students by identifier.
    pub students: BTreeMap<StudentId, Student>,
    /// Cycles by identifier.
    pub cycles: BTreeMap<CycleId, Cycle>,
    /// Payments by identifier.
    pub payments: BTreeMap<PaymentId, Payment>,
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a class group.
    pub fn class_group(&self, id: ClassGroupId) -> Option<&ClassGroup> {
        self.class_groups.get(&id)
    }

    /// Find a class group by its unique name.
    pub fn class_group_by_name(&self, name: &str) -> Option<&ClassGroup> {
        self.class_groups.values().find(|g| g.name == name)
    }

    /// Borrow a student.
    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.get(&id)
    }

    /// Mutably borrow a student.
    pub fn student_mut(&mut self, id: StudentId) -> Option<&mut Student> {
        self.students.get_mut(&id)
    }

    /// Borrow a cycle.
    pub fn cycle(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles.get(&id)
    }

    /// Mutably borrow a cycle.
    pub fn cycle_mut(&mut self, id: CycleId) -> Option<&mut Cycle> {
        self.cycles.get_mut(&id)
    }

    /// Borrow a payment.
    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.get(&id)
    }

    /// Mutably borrow a payment.
    pub fn payment_mut(&mut self, id: PaymentId) -> Option<&mut Payment> {
        self.payments.get_mut(&id)
    }

    /// All cycles belonging to a student.
    pub fn cycles_of(&self, student_id: StudentId) -> impl Iterator<Item = &Cycle> {
        self.cycles
            .values()
            .filter(move |c| c.student_id == student_id)
    }

    /// The student's in-progress cycle, if any.
    pub fn active_cycle(&self, student_id: StudentId) -> Option<&Cycle> {
        self.cycles_of(student_id)
            .find(|c| c.status == CycleStatus::InProgress)
    }

    /// The highest cycle number the student has reached, or 0.
    pub fn max_cycle_number(&self, student_id: StudentId) -> u32 {
        self.cycles_of(student_id)
            .map(|c| c.cycle_number)
            .max()
            .unwrap_or(0)
    }

    /// The student's most recent completed cycle, by cycle number.
    pub fn latest_completed_cycle(&self, student_id: StudentId) -> Option<&Cycle> {
        self.cycles_of(student_id)
            .filter(|c| c.status == CycleStatus::Completed)
            .max_by_key(|c| c.cycle_number)
    }

    /// The cycle that owns an attendance row.
    pub fn cycle_owning(&self, attendance_id: AttendanceId) -> Option<&Cycle> {
        self.cycles
            .values()
            .find(|c| c.session(attendance_id).is_some())
    }

    /// The payment billing a cycle, if issued.
    pub fn payment_for_cycle(&self, cycle_id: CycleId) -> Option<&Payment> {
        self.payments.values().find(|p| p.cycle_id == cycle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cram_state::Attendance;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_cycles() -> (Ledger, StudentId) {
        let mut ledger = Ledger::new();
        let student_id = StudentId::new();

        let mut first = Cycle::new(CycleId::new(), student_id, 1, date(2026, 1, 5));
        for i in 0..8 {
            first.push_session(Attendance::placeholder(
                student_id,
                date(2026, 1, 5) + chrono::Duration::days(i),
            ));
        }
        first.complete(date(2026, 1, 30)).unwrap();
        let second = Cycle::new(CycleId::new(), student_id, 2, date(2026, 3, 2));

        ledger.cycles.insert(first.id, first);
        ledger.cycles.insert(second.id, second);
        (ledger, student_id)
    }

    #[test]
    fn active_cycle_skips_completed() {
        let (ledger, student_id) = ledger_with_cycles();
        let active = ledger.active_cycle(student_id).unwrap();
        assert_eq!(active.cycle_number, 2);
    }

    #[test]
    fn max_cycle_number_counts_all_statuses() {
        let (ledger, student_id) = ledger_with_cycles();
        assert_eq!(ledger.max_cycle_number(student_id), 2);
        assert_eq!(ledger.max_cycle_number(StudentId::new()), 0);
    }

    #[test]
    fn latest_completed_ignores_in_progress() {
        let (ledger, student_id) = ledger_with_cycles();
        assert_eq!(ledger.latest_completed_cycle(student_id).unwrap().cycle_number, 1);
    }

    #[test]
    fn cycle_owning_finds_the_row() {
        let (ledger, student_id) = ledger_with_cycles();
        let completed = ledger.latest_completed_cycle(student_id).unwrap();
        let row = completed.sessions[0].id;
        assert_eq!(ledger.cycle_owning(row).unwrap().id, completed.id);
        assert!(ledger.cycle_owning(AttendanceId::new()).is_none());
    }
}
