//! Data transfer objects returned by use cases.

pub mod ledger_dto;

pub use ledger_dto::{
    AllocationView, InstallmentView, LoanLedgerSnapshot, PaymentView, VoidView,
};
