//! Recompute Ledger Use Case
//!
//! The orchestrator of the full replay cycle: claim the loan, rebuild
//! every derived figure from scratch, persist atomically. Safe to run at
//! any time; running it twice in a row changes nothing.

use std::sync::Arc;

use crate::application::dto::LoanLedgerSnapshot;
use crate::application::ports::Clock;
use crate::domain::ledger::{LedgerError, LedgerRepository};
use crate::domain::shared::LoanId;

/// Use case for recomputing a loan's ledger.
pub struct RecomputeLedgerUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    repo: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> RecomputeLedgerUseCase<R, C>
where
    R: LedgerRepository,
    C: Clock,
{
    /// Create a new `RecomputeLedgerUseCase`.
    pub const fn new(repo: Arc<R>, clock: Arc<C>) -> Self {
        Self { repo, clock }
    }

    /// Run the full reset → purge → replay → aggregate cycle.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ConcurrentRecomputeConflict`] if another cycle
    ///   holds the loan.
    /// - [`LedgerError::LoanNotFound`] for an unknown loan.
    /// - [`LedgerError::OverpaymentRemainder`] if replay leaves money
    ///   unallocated; nothing is persisted.
    /// - [`LedgerError::RecomputeTransactionFailure`] if the commit fails.
    pub async fn execute(&self, loan_id: LoanId) -> Result<LoanLedgerSnapshot, LedgerError> {
        // 1. Claim the loan for the whole cycle
        let mut loan = self.repo.checkout(loan_id).await?;

        // 2. Full replay in memory
        if let Err(err) = loan.recompute(self.clock.today()) {
            tracing::warn!(loan_id = %loan_id, error = %err, "recompute aborted");
            if let Err(abort_err) = self.repo.abort(loan_id).await {
                tracing::error!(loan_id = %loan_id, error = %abort_err, "abort failed");
            }
            return Err(err);
        }

        // 3. Persist atomically and release the claim
        self.repo.commit(&loan).await?;

        tracing::info!(
            loan_id = %loan_id,
            status = %loan.status(),
            balance = %loan.balance(),
            "ledger recomputed"
        );
        Ok(LoanLedgerSnapshot::from(&loan))
    }
}
