//! Installment status derived from amounts and due date.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one scheduled installment.
///
/// Always a derived view of `(amount, paid_amount, due_date)` — never set
/// independently during replay. The two terminal variants are the exception:
/// they come from an explicit lifecycle command and freeze the installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// Not yet due, nothing applied.
    Pending,
    /// Partially covered by payments.
    Partial,
    /// Fully covered within tolerance.
    Paid,
    /// Due date passed with an open balance.
    Overdue,
    /// Canceled by an explicit lifecycle command. Terminal.
    Canceled,
    /// Rolled into a refinanced loan. Terminal.
    Refinanced,
}

impl InstallmentStatus {
    /// Returns true if the installment is frozen: recompute must never
    /// touch its paid amount or status, and it never receives allocations.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Refinanced)
    }

    /// Returns true if the installment still counts toward the loan balance.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Partial | Self::Overdue)
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Paid => write!(f, "PAID"),
            Self::Overdue => write!(f, "OVERDUE"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Refinanced => write!(f, "REFINANCED"),
        }
    }
}
