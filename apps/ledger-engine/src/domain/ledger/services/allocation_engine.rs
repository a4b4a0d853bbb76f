//! FIFO distribution of one payment across a loan's installments.

use chrono::NaiveDate;

use crate::domain::ledger::aggregate::{Installment, Payment};
use crate::domain::ledger::value_objects::Allocation;
use crate::domain::shared::Money;

/// Result of replaying one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Allocations emitted, one per installment touched.
    pub allocations: Vec<Allocation>,
    /// Amount left after every open installment was exhausted.
    ///
    /// Zero (within tolerance) in a validated ledger. The engine reports a
    /// positive remainder instead of failing; the orchestrator decides.
    pub remainder: Money,
}

/// Distributes a payment over installments, oldest obligation first.
///
/// The ascending-sequence walk is a business rule, not an implementation
/// detail: it decides which installments age into overdue first. Terminal
/// installments never receive a share.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Replay one payment against the current pending balances.
    ///
    /// Installments must be sorted by ascending sequence number; the loan
    /// aggregate maintains that order. Each touched installment has its
    /// `paid_amount` incremented and its status immediately re-derived.
    #[must_use]
    pub fn allocate(
        payment: &Payment,
        installments: &mut [Installment],
        today: NaiveDate,
    ) -> AllocationOutcome {
        let mut remaining = payment.amount();
        let mut allocations = Vec::new();

        for installment in installments.iter_mut() {
            if remaining.approx_zero() {
                break;
            }
            if installment.is_terminal() {
                continue;
            }

            let pending = installment.pending_balance();
            if !pending.is_positive() {
                continue;
            }

            let share = pending.min(remaining);
            if share.is_positive() {
                installment.receive(share, today);
                allocations.push(Allocation::new(payment.id(), installment.id(), share));
                remaining = remaining.saturating_sub(share);
            }
        }

        AllocationOutcome {
            allocations,
            remainder: remaining,
        }
    }
}
