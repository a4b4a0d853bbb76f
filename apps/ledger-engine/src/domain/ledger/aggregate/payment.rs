//! Payment entity: one money receipt event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ledger::errors::LedgerError;
use crate::domain::ledger::value_objects::VoidRecord;
use crate::domain::shared::{Money, PaymentId};

/// One money receipt against a loan.
///
/// Amount and timestamp are immutable once created — replay determinism
/// depends on it. The only lifecycle event is voiding, which is terminal
/// and removes the payment from every future replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    amount: Money,
    paid_at: DateTime<Utc>,
    void: Option<VoidRecord>,
}

impl Payment {
    /// Register a new payment.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the amount is not strictly
    /// positive.
    pub fn new(id: PaymentId, amount: Money, paid_at: DateTime<Utc>) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                context: format!("payment {id}"),
                amount,
            });
        }
        Ok(Self {
            id,
            amount,
            paid_at,
            void: None,
        })
    }

    /// Rebuild a payment from persisted state.
    #[must_use]
    pub const fn reconstitute(
        id: PaymentId,
        amount: Money,
        paid_at: DateTime<Utc>,
        void: Option<VoidRecord>,
    ) -> Self {
        Self {
            id,
            amount,
            paid_at,
            void,
        }
    }

    /// Payment identifier.
    #[must_use]
    pub const fn id(&self) -> PaymentId {
        self.id
    }

    /// Amount received.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// When the money was received.
    #[must_use]
    pub const fn paid_at(&self) -> DateTime<Utc> {
        self.paid_at
    }

    /// Void metadata, if the payment was reversed.
    #[must_use]
    pub const fn void(&self) -> Option<&VoidRecord> {
        self.void.as_ref()
    }

    /// True if this payment contributes nothing to any installment.
    #[must_use]
    pub const fn is_voided(&self) -> bool {
        self.void.is_some()
    }

    /// Deterministic replay sort key: chronological, id as tie-break.
    #[must_use]
    pub const fn replay_key(&self) -> (DateTime<Utc>, PaymentId) {
        (self.paid_at, self.id)
    }

    /// Mark the payment voided. Returns `false` without touching anything
    /// if it is already voided (duplicate void requests are tolerated).
    pub(crate) fn mark_voided(&mut self, record: VoidRecord) -> bool {
        if self.void.is_some() {
            return false;
        }
        self.void = Some(record);
        true
    }
}
