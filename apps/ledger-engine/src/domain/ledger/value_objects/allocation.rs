//! Allocation: how much of one payment went to one installment.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{InstallmentId, Money, PaymentId};

/// The record of one payment covering (part of) one installment.
///
/// Allocations are wholly derived: the recompute orchestrator purges and
/// regenerates them on every run, and no other code path creates or edits
/// them. `amount_applied` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    payment_id: PaymentId,
    installment_id: InstallmentId,
    amount_applied: Money,
}

impl Allocation {
    /// Create a new allocation record.
    #[must_use]
    pub const fn new(
        payment_id: PaymentId,
        installment_id: InstallmentId,
        amount_applied: Money,
    ) -> Self {
        Self {
            payment_id,
            installment_id,
            amount_applied,
        }
    }

    /// The payment this allocation draws from.
    #[must_use]
    pub const fn payment_id(&self) -> PaymentId {
        self.payment_id
    }

    /// The installment this allocation covers.
    #[must_use]
    pub const fn installment_id(&self) -> InstallmentId {
        self.installment_id
    }

    /// The amount applied.
    #[must_use]
    pub const fn amount_applied(&self) -> Money {
        self.amount_applied
    }
}
