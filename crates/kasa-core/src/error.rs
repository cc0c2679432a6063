//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasa-core errors (this file)                                           │
//! │  ├── CoreError        - Money/cart domain errors                        │
//! │  └── AllocationError  - Payment allocation rejections                   │
//! │                                                                         │
//! │  kasa-db errors       - DbError (persistence failures)                  │
//! │  kasa-sync errors     - SyncError (transport/classification)            │
//! │  kasa-engine errors   - CheckoutError (orchestration surface)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual Display impls
//! 2. Context in every message (what was invalid, the offending value)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business-logic errors from money and cart operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary input was negative or non-numeric where a non-negative
    /// amount is required.
    ///
    /// Rejected at the boundary and never silently coerced, with one
    /// documented exception: cart-level discount/shipping/tax setters take
    /// the absolute value of their input.
    #[error("Invalid amount for {what}: '{value}'")]
    InvalidAmount { what: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Allocation Error
// =============================================================================

/// Payment allocation rejections.
///
/// Surfaced to the caller before any persistence occurs; a failed
/// allocation leaves no trace anywhere.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// A proposed payment amount was negative.
    #[error("Payment #{index} has a negative amount: {amount}")]
    NegativeAmount { index: usize, amount: Money },

    /// The payments together exceed the transaction total.
    #[error("Overpayment: tendered {tendered} against a total of {total}")]
    Overpayment { total: Money, tendered: Money },

    /// The payments do not cover the total and partial settlement was not
    /// allowed.
    #[error("Underpayment: tendered {tendered} against a total of {total} (partial not allowed)")]
    Underpayment { total: Money, tendered: Money },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidAmount {
            what: "discount".to_string(),
            value: "-1.00".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid amount for discount: '-1.00'");

        let err = AllocationError::Overpayment {
            total: Money::from_minor(3000),
            tendered: Money::from_minor(3500),
        };
        assert!(err.to_string().contains("35.00"));
        assert!(err.to_string().contains("30.00"));
    }
}
