//! Collection Ledger Bounded Context
//!
//! Owns the payment ledger of a loan: the amortization schedule's
//! installments, the append-only payment history, and the allocation
//! records derived from replaying payments oldest-obligation-first.
//!
//! All ledger state is derived. Installment and loan statuses are never
//! set directly; they are recomputed from amounts by the full replay in
//! [`aggregate::Loan::recompute`]. The only exceptions are the terminal
//! lifecycle states (canceled, refinanced), set by explicit commands and
//! frozen thereafter.

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{Installment, Loan, Payment, ReconstitutedLoanParams, ScheduleLine};
pub use errors::LedgerError;
pub use repository::LedgerRepository;
pub use services::{
    AllocationEngine, AllocationOutcome, InstallmentStatusDeriver, InstallmentTally,
    LoanStatusDeriver,
};
pub use value_objects::{Allocation, InstallmentStatus, LoanStatus, VoidRecord};
