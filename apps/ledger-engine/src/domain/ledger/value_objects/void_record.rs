//! Void metadata attached to a reversed payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who voided a payment, when, and why.
///
/// Immutable once set: voiding is terminal, there is no un-void.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidRecord {
    reason: String,
    voided_by: String,
    voided_at: DateTime<Utc>,
}

impl VoidRecord {
    /// Create a new void record.
    #[must_use]
    pub fn new(
        reason: impl Into<String>,
        voided_by: impl Into<String>,
        voided_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reason: reason.into(),
            voided_by: voided_by.into(),
            voided_at,
        }
    }

    /// The stated reason for the void.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The actor who requested the void.
    #[must_use]
    pub fn voided_by(&self) -> &str {
        &self.voided_by
    }

    /// When the void was recorded.
    #[must_use]
    pub const fn voided_at(&self) -> DateTime<Utc> {
        self.voided_at
    }
}
