//! # Calendar Primitives
//!
//! The weekday vocabulary (`mon`..`sun`) used by class groups, the validated
//! non-empty [`WeekdaySet`], and the bounded forward date scan
//! [`next_matching_dates`] that schedule generation and extension are built
//! on.
//!
//! The scan is a pure function over plain dates. It holds no scheduling
//! state, so the 8-session schedule and the one-session extension are both
//! expressible as calls into it and both inherit its 365-day search bound.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How far forward the date scan will look before giving up.
///
/// A weekly class meets at least 52 times a year, so any non-empty weekday
/// set resolves an 8-date schedule well inside this bound. Hitting it means
/// the request itself was malformed.
pub const SCAN_HORIZON_DAYS: i64 = 365;

// ── Weekday ────────────────────────────────────────────────────────────

/// A day of the week, carried on the wire as the codes `mon`..`sun`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Monday.
    Mon,
    /// Tuesday.
    Tue,
    /// Wednesday.
    Wed,
    /// Thursday.
    Thu,
    /// Friday.
    Fri,
    /// Saturday.
    Sat,
    /// Sunday.
    Sun,
}

impl Weekday {
    /// The wire code for this weekday.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// The weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Weekday {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mon" => Ok(Self::Mon),
            "tue" => Ok(Self::Tue),
            "wed" => Ok(Self::Wed),
            "thu" => Ok(Self::Thu),
            "fri" => Ok(Self::Fri),
            "sat" => Ok(Self::Sat),
            "sun" => Ok(Self::Sun),
            other => Err(CalendarError::UnknownWeekday(other.to_string())),
        }
    }
}

// ── WeekdaySet ─────────────────────────────────────────────────────────

/// A non-empty set of weekdays a class meets on.
///
/// Order-irrelevant as a set; serialized as a sorted list of codes.
/// Emptiness is rejected at construction *and* at deserialization, so a
/// `WeekdaySet` in hand always resolves a next matching date within seven
/// days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(BTreeSet<Weekday>);

impl WeekdaySet {
    /// Build a set from any collection of weekdays; duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::EmptyWeekdaySet`] if no weekdays are given.
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Result<Self, CalendarError> {
        let set: BTreeSet<Weekday> = days.into_iter().collect();
        if set.is_empty() {
            return Err(CalendarError::EmptyWeekdaySet);
        }
        Ok(Self(set))
    }

    /// Parse a comma-separated list of codes, e.g. `"mon,wed"`.
    pub fn parse(s: &str) -> Result<Self, CalendarError> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Weekday>, _>>()?;
        Self::new(days)
    }

    /// Whether the given date's weekday is a member.
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.0.contains(&Weekday::of(date))
    }

    /// Iterate the members in `Mon..Sun` order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct weekdays in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: emptiness is unrepresentable.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<Weekday>> for WeekdaySet {
    type Error = CalendarError;

    fn try_from(days: Vec<Weekday>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.0.into_iter().collect()
    }
}

impl std::fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<&str> = self.0.iter().map(Weekday::code).collect();
        f.write_str(&codes.join(","))
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors from calendar construction and scanning.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// A weekday code outside `mon`..`sun`.
    #[error("unknown weekday code {0:?}")]
    UnknownWeekday(String),

    /// A class must meet on at least one weekday.
    #[error("weekday set must not be empty")]
    EmptyWeekdaySet,

    /// The scan walked the full horizon without collecting enough dates.
    #[error("found only {found} of {requested} matching dates within a year of {from}")]
    HorizonExhausted {
        /// Scan origin.
        from: NaiveDate,
        /// How many dates were requested.
        requested: usize,
        /// How many were found before the horizon.
        found: usize,
    },
}

// ── Date scan ──────────────────────────────────────────────────────────

/// Collect the first `count` dates on or after `from` whose weekday is in
/// `weekdays`, in chronological order.
///
/// Walks forward day by day from `from` (inclusive). The result is always
/// exactly `count` dates; a short collection is an error, never a silent
/// truncation.
///
/// # Errors
///
/// Returns [`CalendarError::HorizonExhausted`] if fewer than `count`
/// matching dates exist within [`SCAN_HORIZON_DAYS`] days of `from`.
/// With a [`WeekdaySet`] (non-empty by construction) this is unreachable
/// for any `count` up to 52.
pub fn next_matching_dates(
    from: NaiveDate,
    weekdays: &WeekdaySet,
    count: usize,
) -> Result<Vec<NaiveDate>, CalendarError> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = from;
    for _ in 0..SCAN_HORIZON_DAYS {
        if dates.len() == count {
            break;
        }
        if weekdays.matches(cursor) {
            dates.push(cursor);
        }
        cursor += Duration::days(1);
    }
    if dates.len() < count {
        return Err(CalendarError::HorizonExhausted {
            from,
            requested: count,
            found: dates.len(),
        });
    }
    Ok(dates)
}

/// The single next matching date strictly after `after`.
///
/// Convenience for schedule extension, which appends exactly one session
/// past the current tail.
pub fn next_matching_date(
    after: NaiveDate,
    weekdays: &WeekdaySet,
) -> Result<NaiveDate, CalendarError> {
    let dates = next_matching_dates(after + Duration::days(1), weekdays, 1)?;
    Ok(dates[0])
}
