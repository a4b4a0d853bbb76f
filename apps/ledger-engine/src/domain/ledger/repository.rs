//! Ledger Repository Trait
//!
//! Defines the persistence abstraction for loans, with an explicit
//! transaction boundary. Implemented by adapters in the infrastructure
//! layer.

use async_trait::async_trait;

use super::aggregate::Loan;
use super::errors::LedgerError;
use crate::domain::shared::{LoanId, PaymentId};

/// Repository trait for Loan persistence.
///
/// This is a domain interface (port) implemented by infrastructure
/// adapters (embedded SQLite, in-memory, etc.).
///
/// Writes follow a checkout/commit/abort protocol. [`Self::checkout`]
/// acquires an exclusive per-loan claim and loads the aggregate; every
/// successful checkout MUST be closed by exactly one [`Self::commit`] or
/// [`Self::abort`], otherwise the loan stays claimed. A commit persists
/// the whole aggregate atomically; until then readers keep seeing the
/// previous consistent state.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Persist a freshly originated loan.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RecomputeTransactionFailure`] if the write
    /// fails, or if a loan with the same id already exists.
    async fn create_loan(&self, loan: &Loan) -> Result<(), LedgerError>;

    /// Claim a loan for exclusive mutation and load it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ConcurrentRecomputeConflict`] if another writer
    ///   currently holds the claim.
    /// - [`LedgerError::LoanNotFound`] if no such loan exists.
    async fn checkout(&self, loan_id: LoanId) -> Result<Loan, LedgerError>;

    /// Atomically persist a checked-out loan and release the claim.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RecomputeTransactionFailure`] if the write
    /// fails; the stored state is left as it was and the claim is
    /// released.
    async fn commit(&self, loan: &Loan) -> Result<(), LedgerError>;

    /// Release a claim without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RecomputeTransactionFailure`] if the claim
    /// was not held.
    async fn abort(&self, loan_id: LoanId) -> Result<(), LedgerError>;

    /// Load a loan read-only, without claiming it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LoanNotFound`] if no such loan exists.
    async fn find(&self, loan_id: LoanId) -> Result<Loan, LedgerError>;

    /// Resolve which loan a payment belongs to.
    ///
    /// Payment ids are unique across the store, so a void request only
    /// needs the payment id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PaymentNotFound`] if no loan holds the
    /// payment.
    async fn loan_of_payment(&self, payment_id: PaymentId) -> Result<LoanId, LedgerError>;

    /// Hand out the next store-unique payment id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RecomputeTransactionFailure`] if the id
    /// source is unavailable.
    async fn allocate_payment_id(&self) -> Result<PaymentId, LedgerError>;
}
