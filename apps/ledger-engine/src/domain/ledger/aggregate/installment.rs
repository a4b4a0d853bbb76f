//! Installment entity: one scheduled obligation of a loan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ledger::errors::LedgerError;
use crate::domain::ledger::services::InstallmentStatusDeriver;
use crate::domain::ledger::value_objects::InstallmentStatus;
use crate::domain::shared::{InstallmentId, Money};

/// One scheduled partial obligation of a loan.
///
/// `sequence`, `due_date` and `amount` are fixed at schedule creation.
/// `paid_amount` and `status` are owned by the recompute orchestrator; the
/// only other transition is the one-time terminal command (cancel/refinance)
/// which freezes the installment for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    id: InstallmentId,
    sequence: u32,
    due_date: NaiveDate,
    amount: Money,
    paid_amount: Money,
    status: InstallmentStatus,
}

impl Installment {
    /// Create a new unpaid installment at origination.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the scheduled amount is not
    /// strictly positive.
    pub fn new(
        id: InstallmentId,
        sequence: u32,
        due_date: NaiveDate,
        amount: Money,
        today: NaiveDate,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                context: format!("installment #{sequence}"),
                amount,
            });
        }
        let mut installment = Self {
            id,
            sequence,
            due_date,
            amount,
            paid_amount: Money::ZERO,
            status: InstallmentStatus::Pending,
        };
        installment.rederive_status(today);
        Ok(installment)
    }

    /// Rebuild an installment from persisted state. No validation or
    /// re-derivation: storage is trusted to hold a consistent row.
    #[must_use]
    pub const fn reconstitute(
        id: InstallmentId,
        sequence: u32,
        due_date: NaiveDate,
        amount: Money,
        paid_amount: Money,
        status: InstallmentStatus,
    ) -> Self {
        Self {
            id,
            sequence,
            due_date,
            amount,
            paid_amount,
            status,
        }
    }

    /// Installment identifier (unique within the loan).
    #[must_use]
    pub const fn id(&self) -> InstallmentId {
        self.id
    }

    /// Position in the schedule, 1-based. FIFO allocation key.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Calendar day the installment falls due.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Scheduled amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Amount covered by replayed payments.
    #[must_use]
    pub const fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> InstallmentStatus {
        self.status
    }

    /// True if frozen (canceled/refinanced).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Open balance, clamped to zero. Terminal installments report zero:
    /// they no longer count toward anything.
    #[must_use]
    pub fn pending_balance(&self) -> Money {
        if self.is_terminal() {
            return Money::ZERO;
        }
        self.amount.saturating_sub(self.paid_amount)
    }

    /// Reset to the unpaid baseline before a replay. No-op when terminal.
    pub(crate) fn reset(&mut self, today: NaiveDate) {
        if self.is_terminal() {
            return;
        }
        self.paid_amount = Money::ZERO;
        self.rederive_status(today);
    }

    /// Apply an allocated share and immediately re-derive the status.
    ///
    /// Only the allocation engine calls this, with a share it has already
    /// capped at the pending balance.
    pub(crate) fn receive(&mut self, share: Money, today: NaiveDate) {
        debug_assert!(!self.is_terminal());
        self.paid_amount += share;
        self.rederive_status(today);
    }

    /// Freeze the installment in a terminal state. Idempotent for the same
    /// target state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TerminalConflict`] if the installment already
    /// holds the other terminal state.
    pub(crate) fn freeze(&mut self, target: InstallmentStatus) -> Result<(), LedgerError> {
        debug_assert!(target.is_terminal());
        if self.status == target {
            return Ok(());
        }
        if self.is_terminal() {
            return Err(LedgerError::TerminalConflict {
                entity: format!("installment #{}", self.sequence),
                current: self.status.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    fn rederive_status(&mut self, today: NaiveDate) {
        self.status = InstallmentStatusDeriver::derive(
            self.status,
            self.amount,
            self.paid_amount,
            self.due_date,
            today,
        );
    }
}
