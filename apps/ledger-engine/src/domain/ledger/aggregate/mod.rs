//! Loan aggregate and its entities.

pub mod installment;
pub mod loan;
pub mod payment;

pub use installment::Installment;
pub use loan::{Loan, ReconstitutedLoanParams, ScheduleLine};
pub use payment::Payment;
