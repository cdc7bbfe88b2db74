//! # Tuition Payment Lifecycle
//!
//! One payment per completed cycle. A payment is born `pending` when the
//! cycle completes and moves to `paid` exactly once, when the
//! administrator confirms the transfer or cash receipt.
//!
//! ## States
//!
//! ```text
//! pending ──confirm()──▶ paid (terminal)
//! ```
//!
//! The `message_sent` flag tracks whether the tuition notice was composed
//! for the guardian; it is bookkeeping only and has no effect on billing
//! state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cram_core::{CycleId, PaymentId, StudentId, Timestamp};

// ── Vocabulary ─────────────────────────────────────────────────────────

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Invoice issued, money not yet received.
    Pending,
    /// Money received and confirmed (terminal).
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Paid => f.write_str("paid"),
        }
    }
}

/// A payment status code outside the known vocabulary.
#[derive(Error, Debug)]
#[error("unknown payment status {0:?}")]
pub struct UnknownPaymentStatus(pub String);

impl std::str::FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(UnknownPaymentStatus(other.to_string())),
        }
    }
}

/// How the tuition was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer.
    Transfer,
    /// Cash.
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transfer => f.write_str("transfer"),
            Self::Cash => f.write_str("cash"),
        }
    }
}

/// A payment method code outside the known vocabulary.
#[derive(Error, Debug)]
#[error("unknown payment method {0:?}")]
pub struct UnknownPaymentMethod(pub String);

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer" => Ok(Self::Transfer),
            "cash" => Ok(Self::Cash),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Errors from payment operations.
#[derive(Error, Debug)]
pub enum BillingError {
    /// The payment was already confirmed.
    #[error("payment is already paid")]
    AlreadyPaid,
}

// ── Payment ────────────────────────────────────────────────────────────

/// A tuition invoice for one `(student, cycle)` pair.
///
/// The pair is the idempotence key: the service layer guarantees at most
/// one payment exists per pair, so issuing an invoice twice is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// The billed student.
    pub student_id: StudentId,
    /// The completed cycle being billed.
    pub cycle_id: CycleId,
    /// Amount in won.
    pub amount: i64,
    /// How it was paid; set on confirmation.
    pub payment_method: Option<PaymentMethod>,
    /// Lifecycle state.
    pub status: PaymentStatus,
    /// Whether a tuition notice was composed.
    pub message_sent: bool,
    /// When the notice was composed.
    pub message_sent_at: Option<Timestamp>,
    /// When the payment was confirmed.
    pub paid_at: Option<Timestamp>,
    /// Free-form note.
    pub memo: Option<String>,
    /// When the invoice was issued.
    pub created_at: Timestamp,
}

impl Payment {
    /// Issue a pending invoice.
    pub fn pending(id: PaymentId, student_id: StudentId, cycle_id: CycleId, amount: i64) -> Self {
        Self {
            id,
            student_id,
            cycle_id,
            amount,
            payment_method: None,
            status: PaymentStatus::Pending,
            message_sent: false,
            message_sent_at: None,
            paid_at: None,
            memo: None,
            created_at: Timestamp::now(),
        }
    }

    /// Confirm receipt of the tuition.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::AlreadyPaid`] on a paid payment.
    pub fn confirm(&mut self, method: PaymentMethod, memo: Option<String>) -> Result<(), BillingError> {
        if self.status == PaymentStatus::Paid {
            return Err(BillingError::AlreadyPaid);
        }
        self.status = PaymentStatus::Paid;
        self.payment_method = Some(method);
        self.paid_at = Some(Timestamp::now());
        self.memo = memo;
        Ok(())
    }

    /// Record that the tuition notice was composed. Bookkeeping only.
    pub fn mark_message_sent(&mut self) {
        self.message_sent = true;
        self.message_sent_at = Some(Timestamp::now());
    }

    /// Whether the payment is still awaiting money.
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }
}

// ── Tuition notice ─────────────────────────────────────────────────────

/// The data a guardian-facing tuition notice is rendered from.
#[derive(Debug, Clone)]
pub struct TuitionNotice {
    /// Student name.
    pub student_name: String,
    /// Grade display label from the tuition table.
    pub grade_label: String,
    /// Which cycle completed.
    pub cycle_number: u32,
    /// Sessions in the completed cycle.
    pub total_sessions: u32,
    /// Billed amount in won.
    pub amount: i64,
}

impl TuitionNotice {
    /// Render the plain-text message sent to the guardian.
    pub fn render(&self) -> String {
        format!(
            "Hello, this is the math studio.\n\
             \n\
             {name} ({grade}) has completed\n\
             cycle {number} ({sessions} sessions).\n\
             \n\
             Tuition: {amount} won\n\
             \n\
             The next cycle begins once payment is confirmed.\n\
             Thank you.",
            name = self.student_name,
            grade = self.grade_label,
            number = self.cycle_number,
            sessions = self.total_sessions,
            amount = format_won(self.amount),
        )
    }
}

/// Format a won amount with thousands separators (`280000` → `"280,000"`).
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
