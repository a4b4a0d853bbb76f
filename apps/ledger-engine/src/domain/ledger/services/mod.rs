//! Stateless domain services of the collection-ledger context.

pub mod allocation_engine;
pub mod loan_status_deriver;
pub mod status_deriver;

pub use allocation_engine::{AllocationEngine, AllocationOutcome};
pub use loan_status_deriver::{InstallmentTally, LoanStatusDeriver};
pub use status_deriver::InstallmentStatusDeriver;
