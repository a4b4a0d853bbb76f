//! Application use cases.

pub mod recompute_ledger;
pub mod register_payment;
pub mod void_payment;

pub use recompute_ledger::RecomputeLedgerUseCase;
pub use register_payment::{RegisterPaymentCommand, RegisterPaymentUseCase};
pub use void_payment::{VoidPaymentCommand, VoidPaymentUseCase};
