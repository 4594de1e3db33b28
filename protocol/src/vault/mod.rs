//! # Vault Module
//!
//! Where balances live. Wallets, the per-asset arithmetic underneath them,
//! and the atomic transfer that moves value between two of them.
//!
//! ```text
//! asset.rs     — Validated asset symbols (MERIT is the default)
//! balance.rs   — Per-wallet balance sheet, never below zero
//! wallet.rs    — Wallet: id, balances, debit nonce
//! transfer.rs  — All-or-nothing transfer producing a LedgerEntry
//! registry.rs  — Concurrent wallet store with ordered locking
//! ```
//!
//! All amounts are `u64` in smallest units. Nothing in here divides or
//! touches floating point; conversion from USD happens in the merit engine.

pub mod asset;
pub mod balance;
pub mod registry;
pub mod transfer;
pub mod wallet;

pub use asset::AssetSymbol;
pub use balance::BalanceSheet;
pub use registry::WalletRegistry;
pub use transfer::{self_transfer, transfer, transfer_merit};
pub use wallet::Wallet;
