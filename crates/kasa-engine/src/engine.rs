//! # Checkout Engine
//!
//! Sequences a sale from cart to remote ledger:
//!
//! ```text
//! snapshot ─► allocate ─► COMMIT (durable) ─► clear cart
//!                              │
//!                              ▼
//!                        mark sync_pending ─► push ─┬─► synced
//!                                                   └─► sync_failed
//! ```
//!
//! The commit is the point of no return: everything after it can fail
//! without losing the sale. A push failure produces a receipt that says
//! "saved, not yet synced", never an error.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{info, instrument, warn};

use kasa_core::{allocate, CartTotals, PaymentInput, SettlementStatus, TransactionRecord, TxnStatus};
use kasa_db::TransactionRepository;
use kasa_sync::{FailureKind, PushOutcome, SaleEndpoint, SaleRequest, SyncClient};

use crate::catalog::CatalogLookup;
use crate::error::{CheckoutError, CheckoutResult};
use crate::events::{EventBus, TxnEvent};
use crate::invoice::generate_invoice_number;
use crate::session::CartSession;

// =============================================================================
// Receipt
// =============================================================================

/// Where the sale stands with the remote ledger at receipt time.
#[derive(Debug, Clone)]
pub enum SyncDisposition {
    /// Accepted by the remote ledger during checkout.
    Synced {
        remote_id: String,
        invoice_url: Option<String>,
    },
    /// Saved locally; the push did not go through. The resync sweep will
    /// pick it up.
    Pending {
        kind: FailureKind,
        attempts: u32,
        message: String,
    },
}

impl SyncDisposition {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncDisposition::Synced { .. })
    }
}

/// What checkout hands back to the terminal.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub transaction: TransactionRecord,
    pub settlement: SettlementStatus,
    pub disposition: SyncDisposition,
}

/// Outcome of one resync sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResyncReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    /// Records skipped because a push was already in flight.
    pub skipped: usize,
}

// =============================================================================
// Engine
// =============================================================================

/// Owns the cart session and drives checkout and resync.
pub struct CheckoutEngine<C, E> {
    catalog: C,
    repo: TransactionRepository,
    sync: SyncClient<E>,
    session: CartSession,
    events: EventBus,
    /// Transaction ids currently being pushed; prevents a resync sweep
    /// from double-submitting a record checkout is still working on.
    in_flight: Mutex<HashSet<String>>,
    location_id: String,
}

impl<C: CatalogLookup, E: SaleEndpoint> CheckoutEngine<C, E> {
    pub fn new(
        catalog: C,
        repo: TransactionRepository,
        sync: SyncClient<E>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            repo,
            sync,
            session: CartSession::new(),
            events: EventBus::default(),
            in_flight: Mutex::new(HashSet::new()),
            location_id: location_id.into(),
        }
    }

    /// The shared cart session. Clone it into whatever owns the UI.
    pub fn session(&self) -> &CartSession {
        &self.session
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TxnEvent> {
        self.events.subscribe()
    }

    /// Resolve a product and add one unit of it to the cart.
    pub async fn add_to_cart(
        &self,
        product_id: &str,
        variation_id: &str,
    ) -> CheckoutResult<CartTotals> {
        let item = self
            .catalog
            .resolve(product_id, variation_id, &self.location_id)
            .await
            .ok_or_else(|| CheckoutError::UnknownProduct {
                product_id: product_id.to_string(),
                variation_id: variation_id.to_string(),
            })?;
        Ok(self.session.add_item(&item))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Finalize the sale in the cart.
    ///
    /// Validates payments, commits locally, clears the cart, then makes
    /// one push attempt batch. The returned receipt is `Ok` whether or
    /// not the push succeeded; only validation and local-write problems
    /// are errors, and those leave no record behind.
    #[instrument(skip(self, payments), fields(location_id = %self.location_id))]
    pub async fn checkout(
        &self,
        customer_id: &str,
        payments: &[PaymentInput],
        allow_partial: bool,
    ) -> CheckoutResult<CheckoutReceipt> {
        let snapshot = self.session.snapshot();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let allocation = allocate(snapshot.total, payments, allow_partial)?;
        let invoice_number = generate_invoice_number();

        let record = self
            .repo
            .commit(&snapshot, customer_id, &self.location_id, &allocation, &invoice_number)
            .await?;

        // Durable from here on. The cart can go.
        self.session.clear();
        self.events.emit(&record.id, &invoice_number, TxnStatus::Committed);

        self.claim(&record.id);
        let disposition = {
            let result = self.push_record(&record.id).await;
            self.release(&record.id);
            result?
        };

        let transaction = self.repo.get_by_id(&record.id).await?;
        info!(
            transaction_id = %transaction.id,
            invoice_number = %invoice_number,
            settlement = ?allocation.status,
            synced = disposition.is_synced(),
            "checkout complete"
        );

        Ok(CheckoutReceipt {
            transaction,
            settlement: allocation.status,
            disposition,
        })
    }

    // =========================================================================
    // Resync
    // =========================================================================

    /// Push every record still owed to the remote ledger, oldest first,
    /// one at a time.
    pub async fn resync_pending(&self) -> CheckoutResult<ResyncReport> {
        let candidates = self.repo.list_unsynced().await?;
        let mut report = ResyncReport::default();

        for record in candidates {
            if !self.claim(&record.id) {
                report.skipped += 1;
                continue;
            }
            let result = self.push_record(&record.id).await;
            self.release(&record.id);

            report.attempted += 1;
            match result? {
                SyncDisposition::Synced { .. } => report.synced += 1,
                SyncDisposition::Pending { .. } => report.failed += 1,
            }
        }

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                synced = report.synced,
                failed = report.failed,
                skipped = report.skipped,
                "resync sweep finished"
            );
        }
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// One push for one record: pending → push → synced/failed. The
    /// caller must hold the in-flight claim.
    async fn push_record(&self, id: &str) -> CheckoutResult<SyncDisposition> {
        self.repo.mark_sync_pending(id).await?;
        let record = self.repo.get_by_id(id).await?;
        self.events.emit(id, &record.invoice_number, TxnStatus::SyncPending);

        let lines = self.repo.get_lines(id).await?;
        let payments = self.repo.get_payments(id).await?;
        let request = SaleRequest::from_record(&record, &lines, &payments);

        match self.sync.push(&request).await {
            PushOutcome::Accepted { remote_id, invoice_url } => {
                self.repo.mark_synced(id, &remote_id).await?;
                self.events.emit(id, &record.invoice_number, TxnStatus::Synced);
                Ok(SyncDisposition::Synced { remote_id, invoice_url })
            }
            PushOutcome::Failed(failure) => {
                self.repo.mark_sync_failed(id, &failure.message).await?;
                self.events.emit(id, &record.invoice_number, TxnStatus::SyncFailed);
                warn!(
                    transaction_id = %id,
                    attempts = failure.attempts,
                    kind = ?failure.kind,
                    "sale saved locally, sync pending"
                );
                Ok(SyncDisposition::Pending {
                    kind: failure.kind,
                    attempts: failure.attempts,
                    message: failure.message,
                })
            }
        }
    }

    fn claim(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .expect("in-flight set poisoned")
            .insert(id.to_string())
    }

    fn release(&self, id: &str) {
        self.in_flight
            .lock()
            .expect("in-flight set poisoned")
            .remove(id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
