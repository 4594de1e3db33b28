//! Error types for the accounting core.
//!
//! Wallets, ledger entries, transfers and the merit engine all fail with a
//! [`LedgerError`]. Every variant is caller-visible: the core never retries
//! and never swallows a rejected operation.

use thiserror::Error;

/// Errors raised by wallet, ledger, transfer and mint operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// An amount that must be positive (or a valuation that must be finite
    /// and non-negative) was rejected.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A debit asked for more than the wallet holds. Raised before any
    /// mutation happens.
    #[error("insufficient balance: available {available}, requested {requested} (asset {asset})")]
    InsufficientBalance {
        /// The asset being debited.
        asset: String,
        /// The balance at the time of the check.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// The asset symbol is empty or malformed.
    #[error("invalid asset symbol: {0:?}")]
    InvalidAsset(String),

    /// A wallet, partner or user identifier is empty or malformed.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A credit or mint would push a counter past `u64::MAX`.
    #[error("overflow: {current} + {delta} exceeds u64::MAX")]
    Overflow {
        /// The counter value before the rejected operation.
        current: u64,
        /// The amount that caused the overflow.
        delta: u64,
    },

    /// No wallet is registered under this identifier.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// A wallet with this identifier already exists.
    #[error("wallet already exists: {0}")]
    DuplicateWallet(String),

    /// A ledger record failed hash or chain verification.
    #[error("ledger integrity violation at sequence {sequence}: {reason}")]
    IntegrityViolation {
        /// Sequence number of the first bad record.
        sequence: u64,
        /// What did not match.
        reason: String,
    },
}
