//! # Transaction Repository
//!
//! Sole writer for the transaction tables. A committed sale is written
//! atomically (header + lines + payments in one SQL transaction) and is
//! append-only afterwards: the only mutations allowed are the sync
//! bookkeeping columns on the header.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kasa_core::{
    CartSnapshot, PaymentAllocation, TransactionLine, TransactionPayment, TransactionRecord,
    TxnStatus,
};

use crate::error::{DbError, DbResult};

/// Repository for committed transactions and their lines/payments.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Durably store a finalized sale.
    ///
    /// Writes header, lines and payments in a single SQL transaction so a
    /// crash mid-write leaves nothing behind. The record is stored with
    /// status [`TxnStatus::Committed`]; it is the caller's job to move it
    /// through the sync states afterwards.
    pub async fn commit(
        &self,
        snapshot: &CartSnapshot,
        customer_id: &str,
        location_id: &str,
        allocation: &PaymentAllocation,
        invoice_number: &str,
    ) -> DbResult<TransactionRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, remote_id, invoice_number, customer_id, location_id, status,
                subtotal_minor, discount_minor, shipping_minor, order_tax_minor,
                total_minor, paid_minor, pending_minor,
                sync_attempts, last_sync_error, created_at, updated_at, synced_at
            )
            VALUES (?, NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?, ?, NULL)
            "#,
        )
        .bind(&id)
        .bind(invoice_number)
        .bind(customer_id)
        .bind(location_id)
        .bind(TxnStatus::Committed)
        .bind(snapshot.subtotal.minor())
        .bind(snapshot.discount.minor())
        .bind(snapshot.shipping.minor())
        .bind(snapshot.order_tax.minor())
        .bind(snapshot.total.minor())
        .bind(allocation.paid.minor())
        .bind(allocation.pending.minor())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &snapshot.lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_lines (
                    id, transaction_id, product_id, variation_id, name,
                    unit_price_minor, quantity_milli, discount_minor, tax_minor,
                    line_total_minor, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&line.product_id)
            .bind(&line.variation_id)
            .bind(&line.name)
            .bind(line.unit_price.minor())
            .bind(line.quantity.milli())
            .bind(line.discount.minor())
            .bind(line.tax.minor())
            .bind(line.line_total().minor())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for payment in &allocation.payments {
            sqlx::query(
                r#"
                INSERT INTO transaction_payments (
                    id, transaction_id, method, amount_minor, note, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(payment.method)
            .bind(payment.amount.minor())
            .bind(payment.note.as_deref())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            transaction_id = %id,
            invoice_number = %invoice_number,
            total_minor = snapshot.total.minor(),
            lines = snapshot.lines.len(),
            payments = allocation.payments.len(),
            "transaction committed"
        );

        self.get_by_id(&id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<TransactionRecord> {
        sqlx::query_as::<_, TransactionRecord>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            })
    }

    pub async fn get_by_invoice(&self, invoice_number: &str) -> DbResult<TransactionRecord> {
        sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions WHERE invoice_number = ?",
        )
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound {
            entity: "transaction",
            id: invoice_number.to_string(),
        })
    }

    pub async fn get_lines(&self, transaction_id: &str) -> DbResult<Vec<TransactionLine>> {
        let lines = sqlx::query_as::<_, TransactionLine>(
            "SELECT * FROM transaction_lines WHERE transaction_id = ? ORDER BY rowid",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    pub async fn get_payments(&self, transaction_id: &str) -> DbResult<Vec<TransactionPayment>> {
        let payments = sqlx::query_as::<_, TransactionPayment>(
            "SELECT * FROM transaction_payments WHERE transaction_id = ? ORDER BY rowid",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    pub async fn list_by_status(&self, status: TxnStatus) -> DbResult<Vec<TransactionRecord>> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions WHERE status = ? ORDER BY created_at",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Everything still owed to the remote ledger, oldest first.
    pub async fn list_unsynced(&self) -> DbResult<Vec<TransactionRecord>> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT * FROM transactions
            WHERE status IN ('committed', 'sync_pending', 'sync_failed')
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    // =========================================================================
    // Sync Bookkeeping
    // =========================================================================

    /// Mark a record as handed to the sync client.
    pub async fn mark_sync_pending(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE transactions SET status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(TxnStatus::SyncPending)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            });
        }
        debug!(transaction_id = %id, "marked sync_pending");
        Ok(())
    }

    /// Record remote acceptance: status, remote id, sync timestamp.
    pub async fn mark_synced(&self, id: &str, remote_id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = ?, remote_id = ?, last_sync_error = NULL,
                synced_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(TxnStatus::Synced)
        .bind(remote_id)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            });
        }
        info!(transaction_id = %id, remote_id = %remote_id, "marked synced");
        Ok(())
    }

    /// Record a failed push. Increments the attempt counter and stores the
    /// failure message; the record stays eligible for resync.
    pub async fn mark_sync_failed(&self, id: &str, reason: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = ?, sync_attempts = sync_attempts + 1,
                last_sync_error = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(TxnStatus::SyncFailed)
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "transaction",
                id: id.to_string(),
            });
        }
        warn!(transaction_id = %id, reason = %reason, "marked sync_failed");
        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a draft. Committed records are financial history and are
    /// refused with [`DbError::ImmutableRecord`].
    ///
    /// The checkout flow never stores drafts — an in-progress sale lives
    /// in the cart until `commit` writes it as `Committed` — so this
    /// succeeds only for rows a caller staged as `Draft` itself. Its main
    /// job is guarding the committed history.
    pub async fn delete_draft(&self, id: &str) -> DbResult<()> {
        let record = self.get_by_id(id).await?;
        if record.status.is_committed() {
            return Err(DbError::ImmutableRecord {
                entity: "transaction",
                id: id.to_string(),
                status: format!("{:?}", record.status),
            });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM transaction_lines WHERE transaction_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM transaction_payments WHERE transaction_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::{allocate, Cart, CatalogItem, Money, PaymentInput, PaymentMethod, Quantity};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        let coffee = CatalogItem {
            product_id: "p1".into(),
            variation_id: "v1".into(),
            name: "Coffee".into(),
            unit_price: Money::from_minor(1000),
        };
        let cake = CatalogItem {
            product_id: "p2".into(),
            variation_id: "v1".into(),
            name: "Cake".into(),
            unit_price: Money::from_minor(2000),
        };
        cart.add_or_increment(&coffee);
        cart.add_or_increment(&cake);
        cart
    }

    async fn commit_sample(
        repo: &TransactionRepository,
        invoice: &str,
        payments: Vec<PaymentInput>,
        allow_partial: bool,
    ) -> TransactionRecord {
        let cart = sample_cart();
        let snapshot = cart.snapshot();
        let allocation = allocate(snapshot.total, &payments, allow_partial).unwrap();
        repo.commit(&snapshot, "cust-1", "loc-1", &allocation, invoice)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commit_writes_header_lines_and_payments() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(3000))];
        let record = commit_sample(&repo, "INV-1", payments, false).await;

        assert_eq!(record.status, TxnStatus::Committed);
        assert_eq!(record.total_minor, 3000);
        assert_eq!(record.paid_minor, 3000);
        assert_eq!(record.pending_minor, 0);
        assert_eq!(record.sync_attempts, 0);
        assert!(record.remote_id.is_none());
        assert!(record.synced_at.is_none());

        let lines = repo.get_lines(&record.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Coffee");
        assert_eq!(lines[0].quantity(), Quantity::ONE);
        assert_eq!(lines[0].line_total_minor, 1000);

        let stored_payments = repo.get_payments(&record.id).await.unwrap();
        assert_eq!(stored_payments.len(), 1);
        assert_eq!(stored_payments[0].method, PaymentMethod::Cash);
        assert_eq!(stored_payments[0].amount_minor, 3000);
    }

    #[tokio::test]
    async fn test_commit_partial_records_pending_balance() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Card, Money::from_minor(1000))];
        let record = commit_sample(&repo, "INV-2", payments, true).await;

        assert_eq!(record.paid_minor, 1000);
        assert_eq!(record.pending_minor, 2000);
    }

    #[tokio::test]
    async fn test_invoice_number_is_unique() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(3000))];
        commit_sample(&repo, "INV-DUP", payments.clone(), false).await;

        let cart = sample_cart();
        let snapshot = cart.snapshot();
        let allocation = allocate(snapshot.total, &payments, false).unwrap();
        let err = repo
            .commit(&snapshot, "cust-1", "loc-1", &allocation, "INV-DUP")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_sync_state_transitions() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(3000))];
        let record = commit_sample(&repo, "INV-3", payments, false).await;

        repo.mark_sync_pending(&record.id).await.unwrap();
        let record = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(record.status, TxnStatus::SyncPending);

        repo.mark_sync_failed(&record.id, "connection refused").await.unwrap();
        let record = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(record.status, TxnStatus::SyncFailed);
        assert_eq!(record.sync_attempts, 1);
        assert_eq!(record.last_sync_error.as_deref(), Some("connection refused"));

        repo.mark_synced(&record.id, "remote-42").await.unwrap();
        let record = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(record.status, TxnStatus::Synced);
        assert_eq!(record.remote_id.as_deref(), Some("remote-42"));
        assert!(record.last_sync_error.is_none());
        assert!(record.synced_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_attempts_accumulate() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(3000))];
        let record = commit_sample(&repo, "INV-4", payments, false).await;

        repo.mark_sync_failed(&record.id, "timeout").await.unwrap();
        repo.mark_sync_failed(&record.id, "HTTP 500").await.unwrap();
        repo.mark_sync_failed(&record.id, "HTTP 503").await.unwrap();

        let record = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(record.sync_attempts, 3);
        assert_eq!(record.last_sync_error.as_deref(), Some("HTTP 503"));
    }

    #[tokio::test]
    async fn test_list_unsynced_skips_synced_records() {
        let db = test_db().await;
        let repo = db.transactions();

        let pay = |n: i64| vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(n))];
        let a = commit_sample(&repo, "INV-A", pay(3000), false).await;
        let b = commit_sample(&repo, "INV-B", pay(3000), false).await;

        repo.mark_synced(&a.id, "remote-1").await.unwrap();

        let unsynced = repo.list_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].id, b.id);
    }

    #[tokio::test]
    async fn test_committed_record_cannot_be_deleted() {
        let db = test_db().await;
        let repo = db.transactions();

        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(3000))];
        let record = commit_sample(&repo, "INV-5", payments, false).await;

        let err = repo.delete_draft(&record.id).await.unwrap_err();
        assert!(matches!(err, DbError::ImmutableRecord { .. }));

        // Still there, fully intact.
        let record = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(record.status, TxnStatus::Committed);
    }

    #[tokio::test]
    async fn test_draft_row_can_be_deleted() {
        let db = test_db().await;
        let repo = db.transactions();
        let now = Utc::now();

        // Stage a draft header directly; the checkout flow never writes one.
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_number, customer_id, location_id, status,
                subtotal_minor, total_minor, paid_minor, pending_minor,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind("draft-1")
        .bind("INV-DRAFT")
        .bind("cust-1")
        .bind("loc-1")
        .bind(TxnStatus::Draft)
        .bind(0i64)
        .bind(0i64)
        .bind(0i64)
        .bind(0i64)
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        repo.delete_draft("draft-1").await.unwrap();

        let err = repo.get_by_id("draft-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let db = test_db().await;
        let repo = db.transactions();

        let err = repo.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
