//! Value objects of the collection-ledger context.

pub mod allocation;
pub mod installment_status;
pub mod loan_status;
pub mod void_record;

pub use allocation::Allocation;
pub use installment_status::InstallmentStatus;
pub use loan_status::LoanStatus;
pub use void_record::VoidRecord;
