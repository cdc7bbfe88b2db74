//! # Class Groups
//!
//! A class group is a named weekly meeting pattern: the weekdays it meets,
//! the start time, and a default session length. Attendance schedules are
//! derived from the group's weekday set *at generation time* — editing the
//! group later never resyncs schedules that were already materialized.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cram_core::{ClassGroupId, Timestamp, WeekdaySet};

/// Errors from class-group construction.
#[derive(Error, Debug)]
pub enum ClassGroupError {
    /// Group names are the administrator's handle; blank is not one.
    #[error("class group name must not be empty")]
    EmptyName,
}

/// A named class with a fixed weekly meeting pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassGroup {
    /// Unique identifier.
    pub id: ClassGroupId,
    /// Display name, unique within the studio.
    pub name: String,
    /// Weekdays the class meets on; non-empty by construction.
    pub weekdays: WeekdaySet,
    /// Session start time.
    pub start_time: NaiveTime,
    /// Default session length in minutes.
    pub default_duration_minutes: u32,
    /// Free-form note.
    pub memo: Option<String>,
    /// Whether the group is accepting students.
    pub is_active: bool,
    /// When the group was created.
    pub created_at: Timestamp,
}

impl ClassGroup {
    /// Create a new active class group.
    ///
    /// # Errors
    ///
    /// Returns [`ClassGroupError::EmptyName`] if the trimmed name is empty.
    /// An empty weekday set is unrepresentable — [`WeekdaySet`] rejects it
    /// at construction.
    pub fn new(
        id: ClassGroupId,
        name: impl Into<String>,
        weekdays: WeekdaySet,
        start_time: NaiveTime,
        default_duration_minutes: u32,
        memo: Option<String>,
    ) -> Result<Self, ClassGroupError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ClassGroupError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            weekdays,
            start_time,
            default_duration_minutes,
            memo,
            is_active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Stop accepting students into this group.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cram_core::Weekday;

    fn mon_wed() -> WeekdaySet {
        WeekdaySet::new([Weekday::Mon, Weekday::Wed]).unwrap()
    }

    fn start_time() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 30, 0).unwrap()
    }

    #[test]
    fn new_group_is_active() {
        let group = ClassGroup::new(
            ClassGroupId::new(),
            "Mon/Wed A",
            mon_wed(),
            start_time(),
            90,
            None,
        )
        .unwrap();
        assert!(group.is_active);
        assert_eq!(group.weekdays.len(), 2);
    }

    #[test]
    fn blank_name_rejected() {
        let err = ClassGroup::new(
            ClassGroupId::new(),
            "   ",
            mon_wed(),
            start_time(),
            90,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ClassGroupError::EmptyName));
    }

    #[test]
    fn deactivate_flips_flag() {
        let mut group = ClassGroup::new(
            ClassGroupId::new(),
            "Tue/Thu B",
            WeekdaySet::new([Weekday::Tue, Weekday::Thu]).unwrap(),
            start_time(),
            120,
            Some("middle school".to_string()),
        )
        .unwrap();
        group.deactivate();
        assert!(!group.is_active);
    }

    #[test]
    fn serde_uses_weekday_codes() {
        let group = ClassGroup::new(
            ClassGroupId::new(),
            "Mon/Wed A",
            mon_wed(),
            start_time(),
            90,
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["weekdays"], serde_json::json!(["mon", "wed"]));
    }
}
