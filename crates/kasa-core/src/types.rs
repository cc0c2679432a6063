//! # Domain Types
//!
//! Persisted record shapes and the transaction status machine.
//!
//! ## Transaction Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Transaction Status Machine                          │
//! │                                                                         │
//! │   Draft ──commit()──► Committed ──► SyncPending ──┬──► Synced           │
//! │     │                 (durable,                   │                     │
//! │     │                  pre-network)               └──► SyncFailed ──┐   │
//! │  deletable                                               ▲          │   │
//! │  (undo before commit)                                    └──retry───┘   │
//! │                                                                         │
//! │  • local commit ALWAYS precedes any sync attempt                        │
//! │  • SyncFailed never unwinds the commit; the sale stays queryable        │
//! │  • Committed+ records are append-only financial history                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are integer minor units (`*_minor`), fractional
//! quantities are integer thousandths (`*_milli`); helper accessors return
//! the typed forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::PaymentMethod;
use crate::money::{Money, Quantity};

// =============================================================================
// Transaction Status
// =============================================================================

/// Where a transaction sits between local capture and remote acceptance.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnStatus {
    /// Being assembled; the only deletable state.
    Draft,
    /// Durably stored locally. Reached before any network call.
    Committed,
    /// Handed to the sync client; a push is in flight or queued.
    SyncPending,
    /// The remote ledger accepted it.
    Synced,
    /// The last push failed; eligible for resync indefinitely.
    SyncFailed,
}

impl Default for TxnStatus {
    fn default() -> Self {
        TxnStatus::Draft
    }
}

impl TxnStatus {
    /// True once the record is immutable financial history.
    pub fn is_committed(&self) -> bool {
        !matches!(self, TxnStatus::Draft)
    }

    /// True if a sync attempt is still owed to the remote ledger.
    pub fn needs_sync(&self) -> bool {
        matches!(self, TxnStatus::Committed | TxnStatus::SyncPending | TxnStatus::SyncFailed)
    }
}

// =============================================================================
// Transaction Record
// =============================================================================

/// A transaction header as persisted.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Local identifier (UUID v4), assigned at commit.
    pub id: String,
    /// Remote ledger identifier, set only after acceptance.
    pub remote_id: Option<String>,
    /// Stable human-readable identifier; doubles as the sync
    /// idempotency key.
    pub invoice_number: String,
    pub customer_id: String,
    pub location_id: String,
    pub status: TxnStatus,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub shipping_minor: i64,
    pub order_tax_minor: i64,
    pub total_minor: i64,
    /// Σ payment amounts collected at commit.
    pub paid_minor: i64,
    /// Outstanding balance: `max(0, total − paid)`.
    pub pending_minor: i64,
    /// Number of sync attempts made so far.
    pub sync_attempts: i64,
    /// Last sync failure message, if any.
    pub last_sync_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }

    pub fn paid(&self) -> Money {
        Money::from_minor(self.paid_minor)
    }

    pub fn pending(&self) -> Money {
        Money::from_minor(self.pending_minor)
    }
}

// =============================================================================
// Transaction Line
// =============================================================================

/// A persisted sale line. Snapshot pattern: product details are frozen at
/// commit so history survives later catalog edits.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLine {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub variation_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price_minor: i64,
    /// Quantity in thousandths of a unit.
    pub quantity_milli: i64,
    pub discount_minor: i64,
    pub tax_minor: i64,
    pub line_total_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl TransactionLine {
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    pub fn line_total(&self) -> Money {
        Money::from_minor(self.line_total_minor)
    }
}

// =============================================================================
// Transaction Payment
// =============================================================================

/// A persisted payment row. A transaction can hold several for split
/// tender.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayment {
    pub id: String,
    pub transaction_id: String,
    pub method: PaymentMethod,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionPayment {
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
