//! # Kasa POS Checkout Engine
//!
//! Top-level orchestration: owns the cart session, sequences checkout,
//! and keeps the local store and the remote ledger eventually consistent.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        kasa-engine                               │
//! │                                                                  │
//! │   CartSession ──► CheckoutEngine ──► TransactionRepository (db)  │
//! │   (shared cart)        │       └───► SyncClient (sync)           │
//! │                        ▼                                         │
//! │                    EventBus  (status transitions, broadcast)     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine's one hard promise: a sale that passed validation is
//! durable locally before any network I/O happens, and no network
//! outcome can undo it.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod events;
pub mod invoice;
pub mod session;

pub use catalog::CatalogLookup;
pub use engine::{CheckoutEngine, CheckoutReceipt, ResyncReport, SyncDisposition};
pub use error::{CheckoutError, CheckoutResult};
pub use events::{EventBus, TxnEvent};
pub use invoice::generate_invoice_number;
pub use session::CartSession;
