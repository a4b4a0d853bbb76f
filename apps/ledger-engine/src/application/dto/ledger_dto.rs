//! Ledger snapshot DTOs.
//!
//! The read model every use case returns: the loan's derived state plus,
//! per installment, which payments its `paid_amount` came from. Voided
//! payments never appear in the attribution because the recompute purged
//! their allocations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ledger::{InstallmentStatus, Loan, LoanStatus};
use crate::domain::shared::{InstallmentId, LoanId, Money, PaymentId};

/// Which payment contributed how much to one installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationView {
    /// Contributing payment.
    pub payment_id: PaymentId,
    /// Portion applied to this installment.
    pub amount_applied: Money,
}

/// One installment's derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentView {
    /// Position in the schedule, 1-based.
    pub sequence: u32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Scheduled amount.
    pub amount: Money,
    /// Total applied so far.
    pub paid_amount: Money,
    /// Derived status.
    pub status: InstallmentStatus,
    /// Attribution: the allocations behind `paid_amount`, replay order.
    pub paid_by: Vec<AllocationView>,
}

/// Void metadata on a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidView {
    /// Why the payment was voided.
    pub reason: String,
    /// Who voided it.
    pub voided_by: String,
    /// When it was voided.
    pub voided_at: DateTime<Utc>,
}

/// One payment in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    /// Payment identifier.
    pub payment_id: PaymentId,
    /// Registered amount.
    pub amount: Money,
    /// When the payment was made.
    pub paid_at: DateTime<Utc>,
    /// Present iff the payment is voided.
    pub voided: Option<VoidView>,
}

/// Full derived state of a loan's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLedgerSnapshot {
    /// Loan identifier.
    pub loan_id: LoanId,
    /// Derived loan status.
    pub status: LoanStatus,
    /// Outstanding balance.
    pub balance: Money,
    /// Installments, ascending by sequence.
    pub installments: Vec<InstallmentView>,
    /// Payment history.
    pub payments: Vec<PaymentView>,
}

impl From<&Loan> for LoanLedgerSnapshot {
    fn from(loan: &Loan) -> Self {
        let attribution = |installment_id: InstallmentId| -> Vec<AllocationView> {
            loan.allocations()
                .iter()
                .filter(|a| a.installment_id() == installment_id)
                .map(|a| AllocationView {
                    payment_id: a.payment_id(),
                    amount_applied: a.amount_applied(),
                })
                .collect()
        };

        let installments = loan
            .installments()
            .iter()
            .map(|i| InstallmentView {
                sequence: i.sequence(),
                due_date: i.due_date(),
                amount: i.amount(),
                paid_amount: i.paid_amount(),
                status: i.status(),
                paid_by: attribution(i.id()),
            })
            .collect();

        let payments = loan
            .payments()
            .iter()
            .map(|p| PaymentView {
                payment_id: p.id(),
                amount: p.amount(),
                paid_at: p.paid_at(),
                voided: p.void().map(|v| VoidView {
                    reason: v.reason().to_string(),
                    voided_by: v.voided_by().to_string(),
                    voided_at: v.voided_at(),
                }),
            })
            .collect();

        Self {
            loan_id: loan.id(),
            status: loan.status(),
            balance: loan.balance(),
            installments,
            payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::{ScheduleLine, VoidRecord};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn loan_with_history() -> Loan {
        let mut loan = Loan::originate(
            LoanId::new(7),
            vec![
                ScheduleLine::new(1, date(2024, 2, 1), Money::from_units(100)),
                ScheduleLine::new(2, date(2024, 3, 1), Money::from_units(100)),
            ],
            date(2024, 1, 1),
        )
        .unwrap();
        loan.register_payment(PaymentId::new(1), Money::from_units(150), ts(2024, 1, 2))
            .unwrap();
        loan.recompute(date(2024, 1, 3)).unwrap();
        loan
    }

    #[test]
    fn snapshot_attributes_payments_to_installments() {
        let snapshot = LoanLedgerSnapshot::from(&loan_with_history());

        assert_eq!(snapshot.balance, Money::from_units(50));
        assert_eq!(snapshot.installments[0].paid_by.len(), 1);
        assert_eq!(
            snapshot.installments[0].paid_by[0].amount_applied,
            Money::from_units(100)
        );
        assert_eq!(
            snapshot.installments[1].paid_by[0].amount_applied,
            Money::from_units(50)
        );
    }

    #[test]
    fn voided_payment_keeps_history_row_but_no_attribution() {
        let mut loan = loan_with_history();
        loan.void_payment(
            PaymentId::new(1),
            VoidRecord::new("keyed in twice", "emp-9", ts(2024, 1, 4)),
        )
        .unwrap();
        loan.recompute(date(2024, 1, 3)).unwrap();

        let snapshot = LoanLedgerSnapshot::from(&loan);
        assert_eq!(snapshot.payments.len(), 1);
        assert!(snapshot.payments[0].voided.is_some());
        assert!(snapshot.installments.iter().all(|i| i.paid_by.is_empty()));
        assert_eq!(snapshot.balance, Money::from_units(200));
    }

    #[test]
    fn snapshot_serializes_with_screaming_snake_statuses() {
        let snapshot = LoanLedgerSnapshot::from(&loan_with_history());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"PAID\""));
        assert!(json.contains("\"PARTIAL\""));
        assert!(json.contains("\"ACTIVE\""));
    }
}
