//! Application layer: use cases, ports and DTOs.
//!
//! Orchestrates the domain through the repository and clock ports; owns
//! the transaction choreography (claim, mutate, replay, commit or abort)
//! but none of the business rules.

pub mod dto;
pub mod ports;
pub mod use_cases;

pub use dto::LoanLedgerSnapshot;
pub use ports::{Clock, FixedClock, SystemClock};
pub use use_cases::{
    RecomputeLedgerUseCase, RegisterPaymentCommand, RegisterPaymentUseCase, VoidPaymentCommand,
    VoidPaymentUseCase,
};
