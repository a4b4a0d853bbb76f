//! Shared value objects.

pub mod identifiers;
pub mod money;

pub use identifiers::{InstallmentId, LoanId, PaymentId};
pub use money::Money;
