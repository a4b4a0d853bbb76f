//! Installment status derivation.

use chrono::NaiveDate;

use crate::domain::ledger::value_objects::InstallmentStatus;
use crate::domain::shared::Money;

/// Pure derivation of an installment's status from its amounts and due date.
///
/// Called after every mutation to `paid_amount` so the status can never
/// drift out of sync with the amounts. Rules, in order:
///
/// 1. Terminal states pass through untouched.
/// 2. Balance settled within tolerance → `Paid`.
/// 3. Anything applied → `Partial`.
/// 4. Due date strictly before today → `Overdue`.
/// 5. Otherwise → `Pending`.
pub struct InstallmentStatusDeriver;

impl InstallmentStatusDeriver {
    /// Derive the status for the given amounts.
    #[must_use]
    pub fn derive(
        current: InstallmentStatus,
        amount: Money,
        paid_amount: Money,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> InstallmentStatus {
        if current.is_terminal() {
            return current;
        }
        if paid_amount.covers(amount) {
            return InstallmentStatus::Paid;
        }
        if paid_amount.is_positive() {
            return InstallmentStatus::Partial;
        }
        if due_date < today {
            return InstallmentStatus::Overdue;
        }
        InstallmentStatus::Pending
    }
}
