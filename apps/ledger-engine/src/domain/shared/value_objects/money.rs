//! Money value object for ledger amounts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use crate::domain::shared::DomainError;

/// A monetary amount in the company's collection currency.
///
/// Represented as a Decimal for exact arithmetic: fractions of a cent must
/// never drift across the many small allocations a replay produces.
/// Comparisons that matter to the ledger go through [`Money::approx_eq`],
/// which tolerates [`Money::EPSILON`] of rounding residue from imported data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Tolerance for rounding drift: amounts closer than this are equal.
    pub const EPSILON: Self = Self(dec!(0.000001));

    /// Create a new Money value from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money value from whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this amount is strictly positive beyond tolerance.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Self::EPSILON.0
    }

    /// Returns true if this amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this amount is zero within tolerance.
    #[must_use]
    pub fn approx_zero(&self) -> bool {
        self.0.abs() <= Self::EPSILON.0
    }

    /// Returns true if the two amounts differ by no more than the tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: Self) -> bool {
        (self.0 - other.0).abs() <= Self::EPSILON.0
    }

    /// Returns true if this amount covers `target` within tolerance.
    ///
    /// Used to decide "fully paid": `paid.covers(amount)` is true when the
    /// paid amount reaches the scheduled amount minus EPSILON.
    #[must_use]
    pub fn covers(&self, target: Self) -> bool {
        self.0 >= target.0 - Self::EPSILON.0
    }

    /// Subtraction clamped to zero.
    ///
    /// Rounding residue must never produce a negative pending balance.
    #[must_use]
    pub fn saturating_sub(&self, rhs: Self) -> Self {
        let diff = self.0 - rhs.0;
        if diff < Decimal::ZERO {
            Self::ZERO
        } else {
            Self(diff)
        }
    }

    /// The smaller of the two amounts.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }

    /// Reject negative amounts where a non-negative one is required.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidValue`] if the amount is negative.
    pub fn require_non_negative(&self, field: &str) -> Result<(), DomainError> {
        if self.is_negative() {
            return Err(DomainError::InvalidValue {
                field: field.to_string(),
                message: format!("amount cannot be negative: {self}"),
            });
        }
        Ok(())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}
