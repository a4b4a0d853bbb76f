// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Ledger Engine - Loan Collection Core Library
//!
//! Deterministic payment ledger for installment loans. Every derived
//! figure (installment paid amounts and statuses, allocations, loan
//! balance and status) is rebuilt by replaying the non-voided payment
//! history oldest-obligation-first; nothing is ever patched in place.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `ledger`: Loan aggregate, installment/payment entities, the FIFO
//!     allocation engine and the status derivers
//!   - `shared`: `Money`, strongly-typed ids, shared errors
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `Clock`
//!   - `use_cases`: `RegisterPayment`, `VoidPayment`, `RecomputeLedger`
//!   - `dto`: `LoanLedgerSnapshot` read model
//!
//! - **Infrastructure**: Adapters
//!   - `persistence`: ledger repository (in-memory, embedded Turso)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::ledger::{
    Allocation, AllocationEngine, AllocationOutcome, Installment, InstallmentStatus,
    InstallmentStatusDeriver, InstallmentTally, LedgerError, LedgerRepository, Loan, LoanStatus,
    LoanStatusDeriver, Payment, ReconstitutedLoanParams, ScheduleLine, VoidRecord,
};
pub use domain::shared::{DomainError, InstallmentId, LoanId, Money, PaymentId};

// Application re-exports
pub use application::dto::LoanLedgerSnapshot;
pub use application::ports::{Clock, FixedClock, SystemClock};
pub use application::use_cases::{
    RecomputeLedgerUseCase, RegisterPaymentCommand, RegisterPaymentUseCase, VoidPaymentCommand,
    VoidPaymentUseCase,
};

// Infrastructure re-exports
pub use infrastructure::persistence::{InMemoryLedgerRepository, TursoLedgerStore};
