//! # Ledger
//!
//! The audit trail of the accounting core.
//!
//! ```text
//! entry.rs    — LedgerEntry: immutable, self-hashing transfer record
//! journal.rs  — Ledger: append-only, hash-chained sequence of entries
//! ```

pub mod entry;
pub mod journal;

pub use entry::LedgerEntry;
pub use journal::{verify_records, Ledger, LedgerRecord};
