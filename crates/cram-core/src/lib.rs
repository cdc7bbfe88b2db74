//! # cram-core — Foundational Types for the Studio Stack
//!
//! This crate is the bedrock of the cram studio stack. It defines the
//! vocabulary every other crate speaks; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** [`StudentId`],
//!    [`ClassGroupId`], [`CycleId`], [`AttendanceId`], [`PaymentId`] — all
//!    distinct types over `Uuid`. No bare strings or integers for
//!    identifiers.
//!
//! 2. **Dates vs instants.** Session and cycle dates are `chrono::NaiveDate`
//!    (a class happens on a calendar day); audit instants are the UTC-only,
//!    seconds-precision [`Timestamp`].
//!
//! 3. **Non-empty weekday sets.** [`WeekdaySet`] rejects emptiness at
//!    construction and deserialization, so every schedule scan over one
//!    terminates long before the 365-day horizon.
//!
//! 4. **Configuration as data.** The [`TuitionTable`] is a serde-loadable
//!    collaborator, not a hard-coded lookup.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cram-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod calendar;
pub mod identity;
pub mod temporal;
pub mod tuition;

// Re-export primary types for ergonomic imports.
pub use calendar::{
    next_matching_date, next_matching_dates, CalendarError, Weekday, WeekdaySet,
    SCAN_HORIZON_DAYS,
};
pub use identity::{AttendanceId, ClassGroupId, CycleId, PaymentId, StudentId};
pub use temporal::{Timestamp, TimestampParseError};
pub use tuition::{Grade, GradeRate, TuitionTable, UnknownGrade};
