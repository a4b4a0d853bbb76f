//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts. They wrap `i64`
//! because the replay order tie-break (`payment_date`, then id) relies on
//! ids being totally ordered in insertion order.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new identifier from an integer.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner integer value.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(LoanId, "Unique identifier for a loan (aggregate root).");
define_id!(PaymentId, "Unique identifier for a money receipt event.");
define_id!(
    InstallmentId,
    "Identifier for a scheduled installment, unique within its loan."
);
