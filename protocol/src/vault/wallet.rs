//! # Multi-Asset Wallet
//!
//! A [`Wallet`] holds the balances of one identity. It wraps a
//! [`BalanceSheet`] with an immutable id, amount validation and a debit
//! nonce.
//!
//! ## Nonce Model
//!
//! Every successful debit increments the wallet's nonce. Credits do not,
//! because they are initiated by someone else. External callers use the
//! nonce as a per-wallet sequence number for ordering and idempotence
//! checks. A failed debit leaves the nonce untouched.
//!
//! ## Lifecycle
//!
//! Wallets are created once per identity and never deleted. Every new
//! wallet carries a zero `MERIT` entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::AssetSymbol;
use super::balance::BalanceSheet;
use crate::config::MINT_ISSUER_ID;
use crate::error::LedgerError;
use crate::identity::{generate_uid, validate_identifier};

/// A multi-asset wallet owned by one identity.
///
/// # Thread Safety
///
/// `Wallet` is `Send` but has no internal locking. Shared access goes
/// through [`WalletRegistry`](super::registry::WalletRegistry), which keeps
/// each wallet behind its own mutex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Opaque identifier, fixed at creation.
    id: String,

    /// All asset balances held by this wallet.
    balances: BalanceSheet,

    /// Number of successful debits so far.
    nonce: u64,

    /// When this wallet was created.
    created_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates a wallet for the given identifier with a zero `MERIT`
    /// balance and nonce 0.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidIdentifier`] if `id` is empty,
    /// malformed, or the reserved issuer id.
    pub fn new(id: &str) -> Result<Self, LedgerError> {
        validate_identifier(id)?;
        ensure_not_reserved(id)?;
        Ok(Self {
            id: id.to_string(),
            balances: BalanceSheet::with_assets([AssetSymbol::merit()]),
            nonce: 0,
            created_at: Utc::now(),
        })
    }

    /// Creates a wallet with a freshly generated random identifier.
    pub fn generate() -> Self {
        Self {
            id: generate_uid(None),
            balances: BalanceSheet::with_assets([AssetSymbol::merit()]),
            nonce: 0,
            created_at: Utc::now(),
        }
    }

    /// Returns the wallet identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Returns when this wallet was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // -----------------------------------------------------------------------
    // Balance Operations
    // -----------------------------------------------------------------------

    /// Adds `amount` of `asset` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is 0 and
    /// [`LedgerError::Overflow`] if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        ensure_positive(amount)?;
        let balance = self.balances.credit(asset, amount)?;
        tracing::debug!(wallet = %self.id, %asset, amount, balance, "credit");
        Ok(balance)
    }

    /// Removes `amount` of `asset`, increments the nonce, and returns the
    /// remaining balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is 0 and
    /// [`LedgerError::InsufficientBalance`] if the wallet holds less than
    /// `amount`. Nothing changes on error.
    pub fn debit(&mut self, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        ensure_positive(amount)?;
        let remaining = self.balances.debit(asset, amount)?;
        self.nonce += 1;
        tracing::debug!(wallet = %self.id, %asset, amount, remaining, nonce = self.nonce, "debit");
        Ok(remaining)
    }

    /// Fails unless a credit of `amount` would succeed. Does not mutate.
    pub fn check_credit(&self, asset: &AssetSymbol, amount: u64) -> Result<(), LedgerError> {
        ensure_positive(amount)?;
        self.balances.checked_credit(asset, amount).map(|_| ())
    }

    /// Returns the balance for `asset`; zero if never credited.
    pub fn balance(&self, asset: &AssetSymbol) -> u64 {
        self.balances.get_balance(asset)
    }

    /// Returns every balance, zeros included.
    pub fn balances(&self) -> BTreeMap<AssetSymbol, u64> {
        self.balances.amounts()
    }
}

/// Rejects [`MINT_ISSUER_ID`]. Issuance entries use it as their sender, so
/// a wallet under that id would make mints indistinguishable from debits.
pub(crate) fn ensure_not_reserved(id: &str) -> Result<(), LedgerError> {
    if id == MINT_ISSUER_ID {
        return Err(LedgerError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}

fn ensure_positive(amount: u64) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
