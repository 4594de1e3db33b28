// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # OmniUtil Protocol — Accounting Core
//!
//! The bookkeeping layer of OmniUtil: wallets that hold balances, a journal
//! of self-hashing ledger entries, an atomic transfer between wallets, and
//! a merit engine that mints units from USD valuations while tracking
//! total supply.
//!
//! ## Architecture
//!
//! - **vault** — Asset symbols, balance sheets, wallets, transfers and the
//!   concurrent wallet registry.
//! - **ledger** — Self-hashing entries and the hash-chained journal.
//! - **merit** — USD → MERIT issuance with atomic supply tracking.
//! - **accounting** — Owned facade tying wallets, journal and mint together.
//! - **sdk** — Partner transaction processing and the offline queue.
//! - **partner** — Capability scoring, tier policy, registry, onboarding.
//! - **presence** — Signed proof-of-presence, task state, presence score.
//! - **identity** — Identifier generation and validation.
//! - **crypto** — SHA-256 / BLAKE3 helpers and Ed25519 signer keys.
//! - **config** — Protocol constants.
//!
//! ## Ground Rules
//!
//! 1. Balances are `u64` smallest units. They never go negative and never
//!    silently wrap.
//! 2. A failed operation changes nothing.
//! 3. No process-wide state. Registries and engines are values the caller
//!    owns.
//!
//! ## Example
//!
//! ```
//! use omniutil_protocol::accounting::Accounting;
//! use omniutil_protocol::merit::MeritEngine;
//! use omniutil_protocol::vault::AssetSymbol;
//!
//! let acct = Accounting::new(MeritEngine::new(2.0).unwrap());
//! acct.open_wallet("alice").unwrap();
//! acct.open_wallet("bob").unwrap();
//!
//! acct.issue("alice", 50.0, 1.0).unwrap();
//! acct.transfer("alice", "bob", 30, &AssetSymbol::merit()).unwrap();
//!
//! assert_eq!(acct.wallet("bob").unwrap().balance(&AssetSymbol::merit()), 30);
//! assert!(acct.verify_ledger().is_ok());
//! ```

pub mod accounting;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod merit;
pub mod partner;
pub mod presence;
pub mod sdk;
pub mod vault;

pub use error::LedgerError;
