//! Checkout error types.

use thiserror::Error;

use kasa_core::AllocationError;
use kasa_db::DbError;

/// Errors surfaced to the terminal during checkout.
///
/// A failed sync deliberately has no variant here: by the time a push
/// runs, the sale is already durable, so sync failures are reported as a
/// disposition on the receipt rather than as an error.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("unknown product {product_id}/{variation_id}")]
    UnknownProduct {
        product_id: String,
        variation_id: String,
    },

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("local write failed: {0}")]
    LocalWrite(#[from] DbError),
}

/// Convenience alias for engine results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
