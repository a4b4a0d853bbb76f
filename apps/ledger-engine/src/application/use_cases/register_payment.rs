//! Register Payment Use Case
//!
//! Appends a payment to a loan's history and immediately recomputes the
//! ledger, all under the same exclusive claim so the snapshot returned
//! to the caller is the post-payment truth.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::dto::LoanLedgerSnapshot;
use crate::application::ports::Clock;
use crate::domain::ledger::{LedgerError, LedgerRepository};
use crate::domain::shared::{LoanId, Money};

/// Input for registering a payment.
#[derive(Debug, Clone, Copy)]
pub struct RegisterPaymentCommand {
    /// Target loan.
    pub loan_id: LoanId,
    /// Amount received. Must be positive and within the loan's
    /// outstanding balance.
    pub amount: Money,
    /// When the money was received; `None` means now.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Use case for registering a payment against a loan.
pub struct RegisterPaymentUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    repo: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RegisterPaymentUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    /// Create a new `RegisterPaymentUseCase`.
    pub const fn new(repo: Arc<R>, clock: Arc<C>) -> Self {
        Self { repo, clock }
    }

    /// Register the payment and recompute the ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] for a non-positive amount.
    /// - [`LedgerError::AmountExceedsBalance`] if the amount exceeds the
    ///   loan's outstanding balance.
    /// - [`LedgerError::ConcurrentRecomputeConflict`],
    ///   [`LedgerError::LoanNotFound`],
    ///   [`LedgerError::RecomputeTransactionFailure`] as for any cycle.
    pub async fn execute(
        &self,
        command: RegisterPaymentCommand,
    ) -> Result<LoanLedgerSnapshot, LedgerError> {
        let loan_id = command.loan_id;
        let paid_at = command.paid_at.unwrap_or_else(|| self.clock.now());

        // 1. Claim the loan
        let mut loan = self.repo.checkout(loan_id).await?;

        // 2. Validate and append, then replay
        let result = async {
            let payment_id = self.repo.allocate_payment_id().await?;
            loan.register_payment(payment_id, command.amount, paid_at)?;
            loan.recompute(self.clock.today())?;
            Ok::<_, LedgerError>(payment_id)
        }
        .await;

        let payment_id = match result {
            Ok(payment_id) => payment_id,
            Err(err) => {
                tracing::warn!(loan_id = %loan_id, error = %err, "payment rejected");
                if let Err(abort_err) = self.repo.abort(loan_id).await {
                    tracing::error!(loan_id = %loan_id, error = %abort_err, "abort failed");
                }
                return Err(err);
            }
        };

        // 3. Persist atomically
        self.repo.commit(&loan).await?;

        tracing::info!(
            loan_id = %loan_id,
            payment_id = %payment_id,
            amount = %command.amount,
            balance = %loan.balance(),
            "payment registered"
        );
        Ok(LoanLedgerSnapshot::from(&loan))
    }
}
