//! Domain layer: bounded contexts and shared kernel.
//!
//! Pure business logic with no I/O. Persistence and time are reached
//! only through ports implemented by the outer layers.

pub mod ledger;
pub mod shared;
