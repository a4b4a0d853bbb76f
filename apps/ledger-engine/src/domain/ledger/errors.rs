//! Collection-ledger errors.

use std::fmt;

use crate::domain::shared::{LoanId, Money, PaymentId};

/// Errors that can occur in ledger operations.
///
/// Nothing here is recovered locally: every anomaly either resolves
/// deterministically inside the replay rules or is surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Non-positive or malformed amount; rejected before any mutation.
    InvalidAmount {
        /// What the amount was for.
        context: String,
        /// The offending amount.
        amount: Money,
    },

    /// Registration pre-check: the payment exceeds the loan's open balance.
    AmountExceedsBalance {
        /// Amount tendered.
        amount: Money,
        /// Outstanding balance at the time of the check.
        outstanding: Money,
    },

    /// Replay exhausted all open installments with money left over.
    ///
    /// The allocation engine never drops money silently; a remainder above
    /// tolerance aborts the recompute so the stored ledger stays untouched.
    OverpaymentRemainder {
        /// Payment whose replay left the remainder.
        payment_id: PaymentId,
        /// Unallocated amount.
        remainder: Money,
    },

    /// The per-loan exclusive lock could not be acquired. Retryable.
    ConcurrentRecomputeConflict {
        /// Contended loan.
        loan_id: LoanId,
    },

    /// Unexpected failure inside the recompute transaction, after rollback.
    RecomputeTransactionFailure {
        /// What went wrong.
        reason: String,
    },

    /// Loan not found.
    LoanNotFound {
        /// Loan ID.
        loan_id: LoanId,
    },

    /// Payment not found.
    PaymentNotFound {
        /// Payment ID.
        payment_id: PaymentId,
    },

    /// Installment not found within the loan.
    InstallmentNotFound {
        /// Loan ID.
        loan_id: LoanId,
        /// Sequence number that was looked up.
        sequence: u32,
    },

    /// A lifecycle command hit an entity already in a different terminal state.
    TerminalConflict {
        /// Entity description.
        entity: String,
        /// The terminal state it already holds.
        current: String,
    },

    /// The amortization schedule handed to origination is malformed.
    InvalidSchedule {
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount { context, amount } => {
                write!(f, "Invalid amount for {context}: {amount}")
            }
            Self::AmountExceedsBalance {
                amount,
                outstanding,
            } => {
                write!(
                    f,
                    "Payment of {amount} exceeds outstanding balance {outstanding}"
                )
            }
            Self::OverpaymentRemainder {
                payment_id,
                remainder,
            } => {
                write!(
                    f,
                    "Payment {payment_id} left an unallocated remainder of {remainder}"
                )
            }
            Self::ConcurrentRecomputeConflict { loan_id } => {
                write!(f, "Loan {loan_id} is already being recomputed; retry")
            }
            Self::RecomputeTransactionFailure { reason } => {
                write!(f, "Recompute transaction failed (rolled back): {reason}")
            }
            Self::LoanNotFound { loan_id } => {
                write!(f, "Loan not found: {loan_id}")
            }
            Self::PaymentNotFound { payment_id } => {
                write!(f, "Payment not found: {payment_id}")
            }
            Self::InstallmentNotFound { loan_id, sequence } => {
                write!(f, "Installment #{sequence} not found in loan {loan_id}")
            }
            Self::TerminalConflict { entity, current } => {
                write!(f, "{entity} is already terminal ({current})")
            }
            Self::InvalidSchedule { reason } => {
                write!(f, "Invalid amortization schedule: {reason}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}
