//! # SDK Module
//!
//! What partner integrations call: process a purchase into a
//! [`TransactionRecord`], and buffer records with an [`OfflineQueue`] when
//! the backend is unreachable.

pub mod offline;
pub mod transaction;

pub use offline::OfflineQueue;
pub use transaction::{process_transaction, PartnerClient, TransactionRecord};
