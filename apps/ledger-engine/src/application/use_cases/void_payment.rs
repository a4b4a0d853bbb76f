//! Void Payment Use Case
//!
//! Reverses a payment and replays the remaining history. The void itself
//! only flags the payment; all shifting of amounts between installments
//! is the ordinary recompute doing its job with one payment fewer.

use std::sync::Arc;

use crate::application::dto::LoanLedgerSnapshot;
use crate::application::ports::Clock;
use crate::domain::ledger::{LedgerError, LedgerRepository, VoidRecord};
use crate::domain::shared::PaymentId;

/// Input for voiding a payment.
#[derive(Debug, Clone)]
pub struct VoidPaymentCommand {
    /// Payment to void. Store-unique, so no loan id is needed.
    pub payment_id: PaymentId,
    /// Why the payment is being reversed.
    pub reason: String,
    /// Actor requesting the void.
    pub voided_by: String,
}

/// Use case for voiding a payment and replaying the ledger.
pub struct VoidPaymentUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    repo: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> VoidPaymentUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    /// Create a new `VoidPaymentUseCase`.
    pub const fn new(repo: Arc<R>, clock: Arc<C>) -> Self {
        Self { repo, clock }
    }

    /// Void the payment and recompute its loan.
    ///
    /// Voiding an already-voided payment is a no-op: the original void
    /// metadata stays, no recompute runs, and the current snapshot is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PaymentNotFound`] for an unknown payment.
    /// - [`LedgerError::ConcurrentRecomputeConflict`],
    ///   [`LedgerError::OverpaymentRemainder`],
    ///   [`LedgerError::RecomputeTransactionFailure`] as for any cycle.
    pub async fn execute(
        &self,
        command: VoidPaymentCommand,
    ) -> Result<LoanLedgerSnapshot, LedgerError> {
        let payment_id = command.payment_id;

        // 1. Resolve the owning loan and claim it
        let loan_id = self.repo.loan_of_payment(payment_id).await?;
        let mut loan = self.repo.checkout(loan_id).await?;

        // 2. Flag the payment
        let record = VoidRecord::new(command.reason, command.voided_by, self.clock.now());
        let newly_voided = match loan.void_payment(payment_id, record) {
            Ok(newly_voided) => newly_voided,
            Err(err) => {
                if let Err(abort_err) = self.repo.abort(loan_id).await {
                    tracing::error!(loan_id = %loan_id, error = %abort_err, "abort failed");
                }
                return Err(err);
            }
        };

        if !newly_voided {
            // Duplicate request: release the claim, report current state.
            tracing::debug!(payment_id = %payment_id, "payment already voided");
            self.repo.abort(loan_id).await?;
            let loan = self.repo.find(loan_id).await?;
            return Ok(LoanLedgerSnapshot::from(&loan));
        }

        // 3. Replay the remaining payments
        if let Err(err) = loan.recompute(self.clock.today()) {
            tracing::warn!(loan_id = %loan_id, error = %err, "post-void recompute aborted");
            if let Err(abort_err) = self.repo.abort(loan_id).await {
                tracing::error!(loan_id = %loan_id, error = %abort_err, "abort failed");
            }
            return Err(err);
        }

        // 4. Persist atomically
        self.repo.commit(&loan).await?;

        tracing::info!(
            loan_id = %loan_id,
            payment_id = %payment_id,
            balance = %loan.balance(),
            "payment voided and ledger replayed"
        );
        Ok(LoanLedgerSnapshot::from(&loan))
    }
}
