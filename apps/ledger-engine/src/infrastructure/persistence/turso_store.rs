//! Durable ledger repository on an embedded Turso database.
//!
//! Each commit rewrites the loan's rows inside one `BEGIN IMMEDIATE`
//! transaction, so readers only ever see a fully consistent aggregate.
//! The per-loan claim set lives in-process: contention surfaces as
//! `ConcurrentRecomputeConflict` immediately instead of blocking on the
//! database's single writer.
//!
//! Storage encoding: money as decimal TEXT, dates as ISO-8601 TEXT.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use turso::{Builder, Connection, Database, Value};

use crate::domain::ledger::{
    Allocation, Installment, InstallmentStatus, LedgerError, LedgerRepository, Loan, LoanStatus,
    Payment, ReconstitutedLoanParams, VoidRecord,
};
use crate::domain::shared::{InstallmentId, LoanId, Money, PaymentId};

/// Errors from the Turso adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] turso::Error),

    /// A stored row does not decode into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::RecomputeTransactionFailure {
            reason: err.to_string(),
        }
    }
}

/// `LedgerRepository` backed by a local Turso database file.
pub struct TursoLedgerStore {
    db: Database,
    claims: Mutex<HashSet<i64>>,
    next_payment_id: AtomicI64,
}

impl TursoLedgerStore {
    /// Open (or create) the database at `path` and bootstrap the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the file cannot be opened or the
    /// schema cannot be created.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS loans (
                id INTEGER PRIMARY KEY,
                status TEXT NOT NULL,
                balance TEXT NOT NULL
            )",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS installments (
                loan_id INTEGER NOT NULL,
                id INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                due_date TEXT NOT NULL,
                amount TEXT NOT NULL,
                paid_amount TEXT NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (loan_id, id)
            )",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS payments (
                id INTEGER PRIMARY KEY,
                loan_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                paid_at TEXT NOT NULL,
                void_reason TEXT,
                voided_by TEXT,
                voided_at TEXT
            )",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS allocations (
                loan_id INTEGER NOT NULL,
                payment_id INTEGER NOT NULL,
                installment_id INTEGER NOT NULL,
                amount_applied TEXT NOT NULL
            )",
            (),
        )
        .await?;

        // Payment ids keep counting from wherever the last run stopped.
        let mut rows = conn
            .query("SELECT COALESCE(MAX(id), 0) FROM payments", ())
            .await?;
        let max_id = match rows.next().await? {
            Some(row) => col_i64(&row, 0)?,
            None => 0,
        };

        tracing::info!(path = %path, "ledger store opened");
        Ok(Self {
            db,
            claims: Mutex::new(HashSet::new()),
            next_payment_id: AtomicI64::new(max_id + 1),
        })
    }

    fn release_claim(&self, loan_id: LoanId) -> bool {
        let mut claims = self
            .claims
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        claims.remove(&loan_id.value())
    }

    async fn load_loan(&self, conn: &Connection, loan_id: LoanId) -> Result<Loan, LedgerError> {
        let mut rows = conn
            .query(
                "SELECT status, balance FROM loans WHERE id = ?",
                (loan_id.value(),),
            )
            .await
            .map_err(StoreError::from)?;
        let Some(head) = rows.next().await.map_err(StoreError::from)? else {
            return Err(LedgerError::LoanNotFound { loan_id });
        };
        let status = parse_loan_status(&col_text(&head, 0)?)?;
        let balance = parse_money(&col_text(&head, 1)?)?;

        let mut installments = Vec::new();
        let mut rows = conn
            .query(
                "SELECT id, seq, due_date, amount, paid_amount, status
                 FROM installments WHERE loan_id = ? ORDER BY seq",
                (loan_id.value(),),
            )
            .await
            .map_err(StoreError::from)?;
        while let Some(row) = rows.next().await.map_err(StoreError::from)? {
            let sequence = u32::try_from(col_i64(&row, 1)?).map_err(|_| {
                StoreError::Corrupt("installment sequence out of range".to_string())
            })?;
            installments.push(Installment::reconstitute(
                InstallmentId::new(col_i64(&row, 0)?),
                sequence,
                parse_date(&col_text(&row, 2)?)?,
                parse_money(&col_text(&row, 3)?)?,
                parse_money(&col_text(&row, 4)?)?,
                parse_installment_status(&col_text(&row, 5)?)?,
            ));
        }

        let mut payments = Vec::new();
        let mut rows = conn
            .query(
                "SELECT id, amount, paid_at, void_reason, voided_by, voided_at
                 FROM payments WHERE loan_id = ? ORDER BY id",
                (loan_id.value(),),
            )
            .await
            .map_err(StoreError::from)?;
        while let Some(row) = rows.next().await.map_err(StoreError::from)? {
            let void = match (
                col_opt_text(&row, 3)?,
                col_opt_text(&row, 4)?,
                col_opt_text(&row, 5)?,
            ) {
                (Some(reason), Some(voided_by), Some(voided_at)) => Some(VoidRecord::new(
                    reason,
                    voided_by,
                    parse_datetime(&voided_at)?,
                )),
                (None, None, None) => None,
                _ => {
                    return Err(StoreError::Corrupt(format!(
                        "payment {} has a partial void record",
                        col_i64(&row, 0)?
                    ))
                    .into());
                }
            };
            payments.push(Payment::reconstitute(
                PaymentId::new(col_i64(&row, 0)?),
                parse_money(&col_text(&row, 1)?)?,
                parse_datetime(&col_text(&row, 2)?)?,
                void,
            ));
        }

        let mut allocations = Vec::new();
        let mut rows = conn
            .query(
                "SELECT payment_id, installment_id, amount_applied
                 FROM allocations WHERE loan_id = ? ORDER BY rowid",
                (loan_id.value(),),
            )
            .await
            .map_err(StoreError::from)?;
        while let Some(row) = rows.next().await.map_err(StoreError::from)? {
            allocations.push(Allocation::new(
                PaymentId::new(col_i64(&row, 0)?),
                InstallmentId::new(col_i64(&row, 1)?),
                parse_money(&col_text(&row, 2)?)?,
            ));
        }

        Ok(Loan::reconstitute(ReconstitutedLoanParams {
            id: loan_id,
            status,
            balance,
            installments,
            payments,
            allocations,
        }))
    }

    /// Rewrite every row of the loan. Caller wraps this in a transaction.
    async fn write_loan(conn: &Connection, loan: &Loan) -> Result<(), StoreError> {
        let loan_id = loan.id().value();
        conn.execute("DELETE FROM loans WHERE id = ?", (loan_id,))
            .await?;
        conn.execute("DELETE FROM installments WHERE loan_id = ?", (loan_id,))
            .await?;
        conn.execute("DELETE FROM payments WHERE loan_id = ?", (loan_id,))
            .await?;
        conn.execute("DELETE FROM allocations WHERE loan_id = ?", (loan_id,))
            .await?;

        conn.execute(
            "INSERT INTO loans (id, status, balance) VALUES (?, ?, ?)",
            (
                loan_id,
                encode_loan_status(loan.status()),
                loan.balance().amount().to_string(),
            ),
        )
        .await?;

        for installment in loan.installments() {
            conn.execute(
                "INSERT INTO installments (loan_id, id, seq, due_date, amount, paid_amount, status)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    loan_id,
                    installment.id().value(),
                    i64::from(installment.sequence()),
                    installment.due_date().to_string(),
                    installment.amount().amount().to_string(),
                    installment.paid_amount().amount().to_string(),
                    encode_installment_status(installment.status()),
                ),
            )
            .await?;
        }

        for payment in loan.payments() {
            conn.execute(
                "INSERT INTO payments (id, loan_id, amount, paid_at, void_reason, voided_by, voided_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    payment.id().value(),
                    loan_id,
                    payment.amount().amount().to_string(),
                    payment.paid_at().to_rfc3339(),
                    payment.void().map(|v| v.reason().to_string()),
                    payment.void().map(|v| v.voided_by().to_string()),
                    payment.void().map(|v| v.voided_at().to_rfc3339()),
                ),
            )
            .await?;
        }

        for allocation in loan.allocations() {
            conn.execute(
                "INSERT INTO allocations (loan_id, payment_id, installment_id, amount_applied)
                 VALUES (?, ?, ?, ?)",
                (
                    loan_id,
                    allocation.payment_id().value(),
                    allocation.installment_id().value(),
                    allocation.amount_applied().amount().to_string(),
                ),
            )
            .await?;
        }

        Ok(())
    }

    async fn write_loan_transactional(&self, loan: &Loan) -> Result<(), LedgerError> {
        let conn = self.db.connect().map_err(StoreError::from)?;
        conn.execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(StoreError::from)?;

        if let Err(err) = Self::write_loan(&conn, loan).await {
            if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            return Err(err.into());
        }

        conn.execute("COMMIT", ()).await.map_err(StoreError::from)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for TursoLedgerStore {
    async fn create_loan(&self, loan: &Loan) -> Result<(), LedgerError> {
        let conn = self.db.connect().map_err(StoreError::from)?;
        let mut rows = conn
            .query("SELECT 1 FROM loans WHERE id = ?", (loan.id().value(),))
            .await
            .map_err(StoreError::from)?;
        if rows.next().await.map_err(StoreError::from)?.is_some() {
            return Err(LedgerError::RecomputeTransactionFailure {
                reason: format!("loan {} already exists", loan.id()),
            });
        }
        drop(rows);

        self.write_loan_transactional(loan).await?;
        tracing::debug!(loan_id = %loan.id(), "loan created");
        Ok(())
    }

    async fn checkout(&self, loan_id: LoanId) -> Result<Loan, LedgerError> {
        {
            let mut claims = self
                .claims
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !claims.insert(loan_id.value()) {
                return Err(LedgerError::ConcurrentRecomputeConflict { loan_id });
            }
        }

        let conn = match self.db.connect() {
            Ok(conn) => conn,
            Err(err) => {
                self.release_claim(loan_id);
                return Err(StoreError::from(err).into());
            }
        };
        match self.load_loan(&conn, loan_id).await {
            Ok(loan) => Ok(loan),
            Err(err) => {
                self.release_claim(loan_id);
                Err(err)
            }
        }
    }

    async fn commit(&self, loan: &Loan) -> Result<(), LedgerError> {
        // Persist before releasing the claim: no reader may load a state
        // this commit is about to replace. The claim is released even if
        // the write fails; the stored state is then still the old one.
        {
            let claims = self
                .claims
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !claims.contains(&loan.id().value()) {
                return Err(LedgerError::RecomputeTransactionFailure {
                    reason: format!("loan {} was not checked out", loan.id()),
                });
            }
        }

        let result = self.write_loan_transactional(loan).await;
        self.release_claim(loan.id());
        result?;
        tracing::debug!(loan_id = %loan.id(), "loan committed");
        Ok(())
    }

    async fn abort(&self, loan_id: LoanId) -> Result<(), LedgerError> {
        if self.release_claim(loan_id) {
            Ok(())
        } else {
            Err(LedgerError::RecomputeTransactionFailure {
                reason: format!("loan {loan_id} was not checked out"),
            })
        }
    }

    async fn find(&self, loan_id: LoanId) -> Result<Loan, LedgerError> {
        let conn = self.db.connect().map_err(StoreError::from)?;
        self.load_loan(&conn, loan_id).await
    }

    async fn loan_of_payment(&self, payment_id: PaymentId) -> Result<LoanId, LedgerError> {
        let conn = self.db.connect().map_err(StoreError::from)?;
        let mut rows = conn
            .query(
                "SELECT loan_id FROM payments WHERE id = ?",
                (payment_id.value(),),
            )
            .await
            .map_err(StoreError::from)?;
        match rows.next().await.map_err(StoreError::from)? {
            Some(row) => Ok(LoanId::new(col_i64(&row, 0)?)),
            None => Err(LedgerError::PaymentNotFound { payment_id }),
        }
    }

    async fn allocate_payment_id(&self) -> Result<PaymentId, LedgerError> {
        Ok(PaymentId::new(
            self.next_payment_id.fetch_add(1, Ordering::SeqCst),
        ))
    }
}

// ============================================================================
// Row decoding helpers
// ============================================================================

fn col_i64(row: &turso::Row, idx: usize) -> Result<i64, StoreError> {
    match row.get_value(idx)? {
        Value::Integer(v) => Ok(v),
        other => Err(StoreError::Corrupt(format!(
            "expected integer at column {idx}, got {other:?}"
        ))),
    }
}

fn col_text(row: &turso::Row, idx: usize) -> Result<String, StoreError> {
    match row.get_value(idx)? {
        Value::Text(v) => Ok(v),
        other => Err(StoreError::Corrupt(format!(
            "expected text at column {idx}, got {other:?}"
        ))),
    }
}

fn col_opt_text(row: &turso::Row, idx: usize) -> Result<Option<String>, StoreError> {
    match row.get_value(idx)? {
        Value::Text(v) => Ok(Some(v)),
        Value::Null => Ok(None),
        other => Err(StoreError::Corrupt(format!(
            "expected text or null at column {idx}, got {other:?}"
        ))),
    }
}

fn parse_money(s: &str) -> Result<Money, StoreError> {
    Decimal::from_str(s)
        .map(Money::new)
        .map_err(|e| StoreError::Corrupt(format!("bad amount {s:?}: {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    s.parse::<NaiveDate>()
        .map_err(|e| StoreError::Corrupt(format!("bad date {s:?}: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {s:?}: {e}")))
}

const fn encode_installment_status(status: InstallmentStatus) -> &'static str {
    match status {
        InstallmentStatus::Pending => "PENDING",
        InstallmentStatus::Partial => "PARTIAL",
        InstallmentStatus::Paid => "PAID",
        InstallmentStatus::Overdue => "OVERDUE",
        InstallmentStatus::Canceled => "CANCELED",
        InstallmentStatus::Refinanced => "REFINANCED",
    }
}

fn parse_installment_status(s: &str) -> Result<InstallmentStatus, StoreError> {
    match s {
        "PENDING" => Ok(InstallmentStatus::Pending),
        "PARTIAL" => Ok(InstallmentStatus::Partial),
        "PAID" => Ok(InstallmentStatus::Paid),
        "OVERDUE" => Ok(InstallmentStatus::Overdue),
        "CANCELED" => Ok(InstallmentStatus::Canceled),
        "REFINANCED" => Ok(InstallmentStatus::Refinanced),
        other => Err(StoreError::Corrupt(format!(
            "unknown installment status {other:?}"
        ))),
    }
}

const fn encode_loan_status(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Active => "ACTIVE",
        LoanStatus::Paid => "PAID",
        LoanStatus::Defaulted => "DEFAULTED",
        LoanStatus::Canceled => "CANCELED",
        LoanStatus::Refinanced => "REFINANCED",
    }
}

fn parse_loan_status(s: &str) -> Result<LoanStatus, StoreError> {
    match s {
        "ACTIVE" => Ok(LoanStatus::Active),
        "PAID" => Ok(LoanStatus::Paid),
        "DEFAULTED" => Ok(LoanStatus::Defaulted),
        "CANCELED" => Ok(LoanStatus::Canceled),
        "REFINANCED" => Ok(LoanStatus::Refinanced),
        other => Err(StoreError::Corrupt(format!("unknown loan status {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::ScheduleLine;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn open_store(dir: &TempDir) -> TursoLedgerStore {
        let path = dir.path().join("ledger.db");
        TursoLedgerStore::open(path.to_str().unwrap()).await.unwrap()
    }

    fn make_loan(id: i64) -> Loan {
        Loan::originate(
            LoanId::new(id),
            vec![
                ScheduleLine::new(1, date(2024, 2, 1), Money::from_units(100)),
                ScheduleLine::new(2, date(2024, 3, 1), Money::from_units(100)),
            ],
            date(2024, 1, 1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let loan = make_loan(1);
        store.create_loan(&loan).await.unwrap();

        let loaded = store.find(loan.id()).await.unwrap();
        assert_eq!(loaded, loan);
    }

    #[tokio::test]
    async fn full_cycle_survives_storage() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let loan = make_loan(1);
        store.create_loan(&loan).await.unwrap();

        let mut checked_out = store.checkout(loan.id()).await.unwrap();
        let pid = store.allocate_payment_id().await.unwrap();
        checked_out
            .register_payment(
                pid,
                Money::from_units(150),
                Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap(),
            )
            .unwrap();
        checked_out.recompute(date(2024, 1, 6)).unwrap();
        store.commit(&checked_out).await.unwrap();

        let loaded = store.find(loan.id()).await.unwrap();
        assert_eq!(loaded, checked_out);
        assert_eq!(loaded.balance(), Money::from_units(50));
        assert_eq!(loaded.allocations().len(), 2);
        assert_eq!(store.loan_of_payment(pid).await.unwrap(), loan.id());
    }

    #[tokio::test]
    async fn voided_payment_roundtrips_with_metadata() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let loan = make_loan(1);
        store.create_loan(&loan).await.unwrap();

        let mut checked_out = store.checkout(loan.id()).await.unwrap();
        let pid = store.allocate_payment_id().await.unwrap();
        checked_out
            .register_payment(
                pid,
                Money::from_units(100),
                Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap(),
            )
            .unwrap();
        checked_out.recompute(date(2024, 1, 6)).unwrap();
        checked_out
            .void_payment(
                pid,
                VoidRecord::new(
                    "posted to wrong loan",
                    "emp-3",
                    Utc.with_ymd_and_hms(2024, 1, 7, 10, 0, 0).unwrap(),
                ),
            )
            .unwrap();
        checked_out.recompute(date(2024, 1, 6)).unwrap();
        store.commit(&checked_out).await.unwrap();

        let loaded = store.find(loan.id()).await.unwrap();
        let payment = loaded.payment(pid).unwrap();
        assert!(payment.is_voided());
        assert_eq!(payment.void().unwrap().reason(), "posted to wrong loan");
        assert!(loaded.allocations().is_empty());
    }

    #[tokio::test]
    async fn checkout_is_exclusive_until_commit() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let loan = make_loan(1);
        store.create_loan(&loan).await.unwrap();

        let checked_out = store.checkout(loan.id()).await.unwrap();
        assert!(matches!(
            store.checkout(loan.id()).await,
            Err(LedgerError::ConcurrentRecomputeConflict { .. })
        ));

        store.commit(&checked_out).await.unwrap();
        assert!(store.checkout(loan.id()).await.is_ok());
    }

    #[tokio::test]
    async fn abort_keeps_stored_state() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let loan = make_loan(1);
        store.create_loan(&loan).await.unwrap();

        let mut checked_out = store.checkout(loan.id()).await.unwrap();
        checked_out
            .register_payment(
                store.allocate_payment_id().await.unwrap(),
                Money::from_units(50),
                Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap(),
            )
            .unwrap();
        store.abort(loan.id()).await.unwrap();

        let loaded = store.find(loan.id()).await.unwrap();
        assert!(loaded.payments().is_empty());
    }

    #[tokio::test]
    async fn payment_id_counter_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let pid = {
            let store = open_store(&dir).await;
            let loan = make_loan(1);
            store.create_loan(&loan).await.unwrap();

            let mut checked_out = store.checkout(loan.id()).await.unwrap();
            let pid = store.allocate_payment_id().await.unwrap();
            checked_out
                .register_payment(
                    pid,
                    Money::from_units(50),
                    Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap(),
                )
                .unwrap();
            store.commit(&checked_out).await.unwrap();
            pid
        };

        let reopened = open_store(&dir).await;
        let next = reopened.allocate_payment_id().await.unwrap();
        assert!(next > pid);
    }

    #[tokio::test]
    async fn find_unknown_loan() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        assert!(matches!(
            store.find(LoanId::new(42)).await,
            Err(LedgerError::LoanNotFound { .. })
        ));
    }

    #[test]
    fn status_encoding_roundtrips() {
        for status in [
            InstallmentStatus::Pending,
            InstallmentStatus::Partial,
            InstallmentStatus::Paid,
            InstallmentStatus::Overdue,
            InstallmentStatus::Canceled,
            InstallmentStatus::Refinanced,
        ] {
            let encoded = encode_installment_status(status);
            assert_eq!(parse_installment_status(encoded).unwrap(), status);
        }
        for status in [
            LoanStatus::Active,
            LoanStatus::Paid,
            LoanStatus::Defaulted,
            LoanStatus::Canceled,
            LoanStatus::Refinanced,
        ] {
            let encoded = encode_loan_status(status);
            assert_eq!(parse_loan_status(encoded).unwrap(), status);
        }
    }
}
