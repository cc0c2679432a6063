//! Repository layer. One repository per aggregate; each holds a cheap
//! clone of the shared pool.

mod transaction;

pub use transaction::TransactionRepository;
