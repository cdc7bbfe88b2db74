//! # cram-service — Single-Actor Orchestration
//!
//! The administrative interface over the studio's state. One actor, one
//! ledger, synchronous verbs; each verb validates against loaded state and
//! commits its mutations together.
//!
//! - **Store** ([`store`]): the serde-able in-memory [`Ledger`] holding
//!   class groups, students, cycles, and payments.
//!
//! - **Service** ([`service`]): the verb-shaped interface —
//!   status changes, attendance create/update/delete, cycle start and
//!   completion, invoice issuance and confirmation — plus the operational
//!   queries (cycle alerts, roll call, rosters).
//!
//! - **Error** ([`error`]): the aggregated [`ServiceError`] the verbs
//!   surface.
//!
//! The domain machines themselves live in [`cram_state`]; this crate owns
//! everything that crosses machine boundaries, including the rule that a
//! student's next cycle may only start once the predecessor's invoice is
//! paid.

pub mod error;
pub mod service;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use error::ServiceError;
pub use service::{CycleAlert, StatusFilter, StudioService};
pub use store::Ledger;
