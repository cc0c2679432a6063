//! # Kasa POS Sync Client
//!
//! Pushes locally committed sales to the remote ledger.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         kasa-sync                              │
//! │                                                                │
//! │   SaleRequest (payload.rs)     decimal-string wire form        │
//! │        │                                                       │
//! │        ▼                                                       │
//! │   SyncClient (client.rs)       bounded retry loop              │
//! │        │        classify: Retryable / Terminal / AuthRequired  │
//! │        ▼                                                       │
//! │   SaleEndpoint (trait)  ◄───  HttpSaleEndpoint (reqwest)       │
//! │                         ◄───  scripted fakes in tests          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client is stateless with respect to local storage: it reports a
//! [`PushOutcome`] and the engine decides what that means for the record.
//! A failed push is never an error from the caller's point of view; the
//! sale is already safe on disk.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod retry;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::{HttpSaleEndpoint, PushOutcome, SaleEndpoint, SyncClient, SyncFailure};
pub use config::SyncConfig;
pub use error::{FailureKind, SyncError, SyncResult};
pub use payload::{SaleLine, SalePayment, SaleRequest, SaleResponse};
pub use retry::{Backoff, RetryPolicy};
