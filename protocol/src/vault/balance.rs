//! # Balance Sheets
//!
//! A [`BalanceSheet`] is the complete set of asset balances for a single
//! wallet. It maps [`AssetSymbol`] to an amount and enforces the one
//! invariant the ledger cannot live without: a balance never goes below
//! zero. Amounts are `u64` smallest units, so "negative" is unrepresentable
//! and every subtraction is guarded by an explicit sufficiency check.
//!
//! Validation of the *amount* (zero is rejected) happens one level up in
//! [`Wallet`](super::wallet::Wallet); the sheet only does arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::asset::AssetSymbol;
use crate::error::LedgerError;

/// Every asset balance held by one wallet, in smallest units.
///
/// Backed by a `BTreeMap` so serialized sheets list assets in a stable
/// order. Not `Sync` on its own; the registry wraps whole wallets in locks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    balances: BTreeMap<AssetSymbol, u64>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sheet with a zero entry for each given asset.
    pub fn with_assets(assets: impl IntoIterator<Item = AssetSymbol>) -> Self {
        Self {
            balances: assets.into_iter().map(|asset| (asset, 0)).collect(),
        }
    }

    /// Returns the balance that a credit of `amount` would produce, without
    /// touching the sheet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the credit would exceed `u64::MAX`.
    pub fn checked_credit(&self, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        let current = self.get_balance(asset);
        current.checked_add(amount).ok_or(LedgerError::Overflow {
            current,
            delta: amount,
        })
    }

    /// Adds `amount` to an asset balance, creating the entry at zero first
    /// if the asset has never been seen. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the credit would exceed
    /// `u64::MAX`. The sheet is unchanged in that case.
    pub fn credit(&mut self, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        let new_amount = self.checked_credit(asset, amount)?;
        self.balances.insert(asset.clone(), new_amount);
        Ok(new_amount)
    }

    /// Subtracts `amount` from an asset balance. Returns the remaining
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if the balance (zero for
    /// an unseen asset) is below `amount`. The sheet is unchanged in that
    /// case.
    pub fn debit(&mut self, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        let available = self.get_balance(asset);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                available,
                requested: amount,
            });
        }

        let remaining = available - amount;
        self.balances.insert(asset.clone(), remaining);
        Ok(remaining)
    }

    /// Returns the balance for an asset; zero if it has never been credited.
    pub fn get_balance(&self, asset: &AssetSymbol) -> u64 {
        self.balances.get(asset).copied().unwrap_or(0)
    }

    /// Returns every balance, zeros included, in asset order.
    pub fn amounts(&self) -> BTreeMap<AssetSymbol, u64> {
        self.balances.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
