//! # Kasa POS Database Layer
//!
//! Local-first SQLite persistence for committed transactions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        kasa-db                              │
//! │                                                             │
//! │   Database (pool.rs)                                        │
//! │      │  WAL journal, foreign keys on, embedded migrations   │
//! │      ▼                                                      │
//! │   TransactionRepository (repository/transaction.rs)         │
//! │      • commit()       atomic header + lines + payments      │
//! │      • mark_*()       sync bookkeeping on the header only   │
//! │      • list_unsynced  resync work queue                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Committed rows are append-only financial history. The sync bookkeeping
//! columns (`status`, `remote_id`, `sync_attempts`, `last_sync_error`,
//! `synced_at`) are the only mutable state after commit.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::TransactionRepository;
