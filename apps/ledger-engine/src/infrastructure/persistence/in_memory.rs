//! In-memory ledger repository for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ledger::{LedgerError, LedgerRepository, Loan};
use crate::domain::shared::{LoanId, PaymentId};

/// In-memory implementation of `LedgerRepository`.
///
/// Claims are a plain set of loan ids behind a mutex, mirroring what the
/// durable adapter does in-process. Commits replace the stored aggregate
/// wholesale, so readers always see a consistent state.
pub struct InMemoryLedgerRepository {
    loans: RwLock<HashMap<i64, Loan>>,
    payment_index: RwLock<HashMap<i64, i64>>,
    claims: Mutex<HashSet<i64>>,
    next_payment_id: AtomicI64,
}

impl InMemoryLedgerRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loans: RwLock::new(HashMap::new()),
            payment_index: RwLock::new(HashMap::new()),
            claims: Mutex::new(HashSet::new()),
            next_payment_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryLedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn create_loan(&self, loan: &Loan) -> Result<(), LedgerError> {
        let mut loans = self
            .loans
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if loans.contains_key(&loan.id().value()) {
            return Err(LedgerError::RecomputeTransactionFailure {
                reason: format!("loan {} already exists", loan.id()),
            });
        }
        loans.insert(loan.id().value(), loan.clone());
        Ok(())
    }

    async fn checkout(&self, loan_id: LoanId) -> Result<Loan, LedgerError> {
        {
            let mut claims = self
                .claims
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !claims.insert(loan_id.value()) {
                return Err(LedgerError::ConcurrentRecomputeConflict { loan_id });
            }
        }

        let loans = self.loans.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(loan) = loans.get(&loan_id.value()) {
            Ok(loan.clone())
        } else {
            drop(loans);
            let mut claims = self
                .claims
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            claims.remove(&loan_id.value());
            Err(LedgerError::LoanNotFound { loan_id })
        }
    }

    async fn commit(&self, loan: &Loan) -> Result<(), LedgerError> {
        // Persist before releasing the claim: no reader may load a state
        // this commit is about to replace.
        {
            let claims = self
                .claims
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !claims.contains(&loan.id().value()) {
                return Err(LedgerError::RecomputeTransactionFailure {
                    reason: format!("loan {} was not checked out", loan.id()),
                });
            }
        }

        {
            let mut loans = self
                .loans
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let mut index = self
                .payment_index
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for payment in loan.payments() {
                index.insert(payment.id().value(), loan.id().value());
            }
            loans.insert(loan.id().value(), loan.clone());
        }

        let mut claims = self
            .claims
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        claims.remove(&loan.id().value());
        Ok(())
    }

    async fn abort(&self, loan_id: LoanId) -> Result<(), LedgerError> {
        let mut claims = self
            .claims
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if claims.remove(&loan_id.value()) {
            Ok(())
        } else {
            Err(LedgerError::RecomputeTransactionFailure {
                reason: format!("loan {loan_id} was not checked out"),
            })
        }
    }

    async fn find(&self, loan_id: LoanId) -> Result<Loan, LedgerError> {
        let loans = self.loans.read().unwrap_or_else(PoisonError::into_inner);
        loans
            .get(&loan_id.value())
            .cloned()
            .ok_or(LedgerError::LoanNotFound { loan_id })
    }

    async fn loan_of_payment(&self, payment_id: PaymentId) -> Result<LoanId, LedgerError> {
        let index = self
            .payment_index
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        index
            .get(&payment_id.value())
            .map(|id| LoanId::new(*id))
            .ok_or(LedgerError::PaymentNotFound { payment_id })
    }

    async fn allocate_payment_id(&self) -> Result<PaymentId, LedgerError> {
        Ok(PaymentId::new(
            self.next_payment_id.fetch_add(1, Ordering::SeqCst),
        ))
    }
}
