//! # kasa-core: Pure Business Logic for Kasa POS
//!
//! This crate contains the monetary and cart logic of the POS as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasa POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                kasa-engine (orchestration)                      │   │
//! │  │    cart session ─► checkout ─► recorder ─► sync client          │   │
//! │  └───────────────┬──────────────────────────┬──────────────────────┘   │
//! │                  │                          │                          │
//! │  ┌───────────────▼─────────┐  ┌─────────────▼────────────────────┐    │
//! │  │  kasa-db (SQLite)       │  │  kasa-sync (HTTP)                │    │
//! │  └───────────────┬─────────┘  └─────────────┬────────────────────┘    │
//! │                  │                          │                          │
//! │  ┌───────────────▼──────────────────────────▼──────────────────────┐  │
//! │  │               ★ kasa-core (THIS CRATE) ★                        │  │
//! │  │                                                                 │  │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │  │
//! │  │   │   money   │  │   cart    │  │ allocation │  │   types   │  │  │
//! │  │   │   Money   │  │   Cart    │  │ allocate() │  │ TxnStatus │  │  │
//! │  │   │  Quantity │  │ LineItem  │  │ Settlement │  │  records  │  │  │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │  │
//! │  │                                                                 │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, no side effects
//! 2. **Integer money**: all totals are i64 minor units, never floats
//! 3. **Explicit errors**: typed enums, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use kasa_core::{allocate, Cart, CatalogItem, Money, SettlementStatus};
//!
//! let mut cart = Cart::new();
//! cart.add_or_increment(&CatalogItem {
//!     product_id: "p1".into(),
//!     variation_id: "v1".into(),
//!     name: "Espresso".into(),
//!     unit_price: Money::from_minor(350),
//! });
//!
//! let snapshot = cart.snapshot();
//! let alloc = allocate(snapshot.total, &[], true).unwrap();
//! assert_eq!(alloc.status, SettlementStatus::Debit);
//! assert_eq!(alloc.pending, snapshot.total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{allocate, PaymentAllocation, PaymentInput, PaymentMethod, SettlementStatus};
pub use cart::{Cart, CartSnapshot, CartTotals, CatalogItem, LineItem, LineKey};
pub use error::{AllocationError, CoreError, CoreResult};
pub use money::{Money, Quantity};
pub use types::{TransactionLine, TransactionPayment, TransactionRecord, TxnStatus};
