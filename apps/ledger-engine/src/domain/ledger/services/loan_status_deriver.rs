//! Loan-level status rollup.

use crate::domain::ledger::aggregate::Installment;
use crate::domain::ledger::value_objects::{InstallmentStatus, LoanStatus};
use crate::domain::shared::Money;

/// Aggregated installment figures used for the loan status rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallmentTally {
    /// Sum of scheduled amounts over non-terminal installments.
    pub total_scheduled: Money,
    /// Sum of paid amounts over non-terminal installments.
    pub total_paid: Money,
    /// Count of `Paid` installments.
    pub paid: usize,
    /// Count of `Partial` installments.
    pub partial: usize,
    /// Count of `Pending` installments.
    pub pending: usize,
    /// Count of `Overdue` installments.
    pub overdue: usize,
}

impl InstallmentTally {
    /// Tally up a loan's installments. Terminal installments are excluded
    /// from amounts and counts: they no longer owe anything.
    #[must_use]
    pub fn from_installments(installments: &[Installment]) -> Self {
        let mut tally = Self::default();
        for installment in installments {
            match installment.status() {
                InstallmentStatus::Paid => tally.paid += 1,
                InstallmentStatus::Partial => tally.partial += 1,
                InstallmentStatus::Pending => tally.pending += 1,
                InstallmentStatus::Overdue => tally.overdue += 1,
                InstallmentStatus::Canceled | InstallmentStatus::Refinanced => continue,
            }
            tally.total_scheduled += installment.amount();
            tally.total_paid += installment.paid_amount();
        }
        tally
    }

    /// Open balance across non-terminal installments, clamped per row.
    #[must_use]
    pub fn outstanding(&self) -> Money {
        self.total_scheduled.saturating_sub(self.total_paid)
    }
}

/// Rolls up installment states into the loan-level status.
pub struct LoanStatusDeriver;

impl LoanStatusDeriver {
    /// Derive the loan status from the tally.
    ///
    /// A terminal current status (canceled/refinanced) is returned untouched:
    /// those are set by explicit lifecycle commands and recompute is not
    /// authorized to override them.
    #[must_use]
    pub fn derive(current: LoanStatus, tally: &InstallmentTally) -> LoanStatus {
        if current.is_terminal() {
            return current;
        }

        let all_cleared = tally.outstanding().approx_zero()
            && tally.pending + tally.partial + tally.overdue == 0;
        if all_cleared {
            return LoanStatus::Paid;
        }
        if tally.overdue > 0 {
            return LoanStatus::Defaulted;
        }
        LoanStatus::Active
    }
}
