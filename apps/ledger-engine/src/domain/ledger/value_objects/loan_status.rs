//! Loan-level status rolled up from installment states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate status of a loan.
///
/// Derived from installment counts by the loan status deriver, except the
/// terminal variants which are set by explicit lifecycle commands and are
/// never overridden by recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// Open, with installments still being collected.
    Active,
    /// Every installment settled.
    Paid,
    /// At least one installment overdue.
    Defaulted,
    /// Canceled by an explicit lifecycle command. Terminal.
    Canceled,
    /// Replaced by a refinanced loan. Terminal.
    Refinanced,
}

impl LoanStatus {
    /// Returns true if recompute is not authorized to change this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Refinanced)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Paid => write!(f, "PAID"),
            Self::Defaulted => write!(f, "DEFAULTED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Refinanced => write!(f, "REFINANCED"),
        }
    }
}
