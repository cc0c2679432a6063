//! # Payment Allocator
//!
//! Validates a set of proposed payments against a transaction total and
//! classifies the settlement.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Settlement Classification                              │
//! │                                                                         │
//! │  Σ amounts == total            ──► Paid     (pending = 0)               │
//! │  0 < Σ amounts < total         ──► Partial  (pending = total − Σ)       │
//! │  Σ amounts == 0, total > 0     ──► Debit    (pending = total)           │
//! │  Σ amounts > total             ──► REJECTED (Overpayment)               │
//! │  under total, !allow_partial   ──► REJECTED (Underpayment)              │
//! │  any amount < 0                ──► REJECTED (NegativeAmount)            │
//! │                                                                         │
//! │  Validation order: negative → overpayment → underpayment.               │
//! │  First failure wins; a rejected allocation persists nothing.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money is integer minor units, so the rounding epsilon the comparison
//! would otherwise need collapses to exact equality.

use serde::{Deserialize, Serialize};

use crate::error::AllocationError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment was tendered.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Cheque,
    Mobile,
    Other,
}

// =============================================================================
// Payment Input
// =============================================================================

/// One proposed payment as entered at the terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: Money,
    pub note: Option<String>,
}

impl PaymentInput {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        PaymentInput {
            method,
            amount,
            note: None,
        }
    }

    pub fn with_note(method: PaymentMethod, amount: Money, note: impl Into<String>) -> Self {
        PaymentInput {
            method,
            amount,
            note: Some(note.into()),
        }
    }
}

// =============================================================================
// Settlement Status
// =============================================================================

/// The three-way settlement outcome that drives receipt text and the
/// transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Fully covered: pending is zero.
    Paid,
    /// Collected something, but less than the total.
    Partial,
    /// Nothing collected at commit time; the full amount is outstanding.
    Debit,
}

// =============================================================================
// Payment Allocation
// =============================================================================

/// A validated allocation: the payments, what they cover, and what remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub payments: Vec<PaymentInput>,
    pub total: Money,
    /// Σ payment amounts.
    pub paid: Money,
    /// `max(0, total − paid)` — the outstanding balance.
    pub pending: Money,
    pub status: SettlementStatus,
}

/// Validates `proposed` against `total`.
///
/// ## Validation Order (first failure wins)
/// 1. every amount ≥ 0
/// 2. Σ amounts ≤ total (overpayment is always rejected)
/// 3. unless `allow_partial`, Σ amounts must equal total
///
/// On success the allocation carries the outstanding balance and the
/// derived [`SettlementStatus`]. An empty payment list with
/// `allow_partial` is a valid full-debit sale.
pub fn allocate(
    total: Money,
    proposed: &[PaymentInput],
    allow_partial: bool,
) -> Result<PaymentAllocation, AllocationError> {
    for (index, payment) in proposed.iter().enumerate() {
        if payment.amount.is_negative() {
            return Err(AllocationError::NegativeAmount {
                index,
                amount: payment.amount,
            });
        }
    }

    let paid: Money = proposed.iter().map(|p| p.amount).sum();

    if paid > total {
        return Err(AllocationError::Overpayment {
            total,
            tendered: paid,
        });
    }

    if !allow_partial && paid < total {
        return Err(AllocationError::Underpayment {
            total,
            tendered: paid,
        });
    }

    let pending = (total - paid).clamp_non_negative();
    let status = if pending.is_zero() {
        SettlementStatus::Paid
    } else if paid.is_zero() {
        SettlementStatus::Debit
    } else {
        SettlementStatus::Partial
    };

    Ok(PaymentAllocation {
        payments: proposed.to_vec(),
        total,
        paid,
        pending,
        status,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
