//! # Transfers
//!
//! Moves value from one wallet to another and returns the
//! [`LedgerEntry`] that documents it.
//!
//! The operation is all-or-nothing. Every check that can fail runs before
//! the first mutation:
//!
//! 1. the amount is positive,
//! 2. the receiver can absorb the credit without overflowing,
//! 3. the sender's debit (balance check, then subtract).
//!
//! Once the debit succeeds the credit cannot fail, so the caller either
//! gets an entry with both wallets updated or an error with both wallets
//! untouched.
//!
//! These functions take `&mut Wallet`, so the borrow checker already rules
//! out concurrent mutation. For shared wallets, go through
//! [`WalletRegistry::transfer`](super::registry::WalletRegistry::transfer),
//! which adds the locking.

use super::asset::AssetSymbol;
use super::wallet::Wallet;
use crate::error::LedgerError;
use crate::ledger::LedgerEntry;

/// Transfers `amount` of `asset` from `sender` to `receiver`.
///
/// # Errors
///
/// - [`LedgerError::InvalidAmount`] if `amount` is 0.
/// - [`LedgerError::Overflow`] if the receiver's balance would overflow.
/// - [`LedgerError::InsufficientBalance`] if the sender holds less than
///   `amount`.
///
/// Neither wallet changes on error.
pub fn transfer(
    sender: &mut Wallet,
    receiver: &mut Wallet,
    amount: u64,
    asset: &AssetSymbol,
) -> Result<LedgerEntry, LedgerError> {
    receiver.check_credit(asset, amount)?;
    let entry = LedgerEntry::new(sender.id(), receiver.id(), amount, asset.clone())?;
    sender.debit(asset, amount)?;
    receiver.credit(asset, amount)?;

    tracing::debug!(
        sender = %entry.sender(),
        receiver = %entry.receiver(),
        amount,
        %asset,
        hash = %entry.hash(),
        "transfer"
    );
    Ok(entry)
}

/// [`transfer`] in the default `MERIT` asset.
pub fn transfer_merit(
    sender: &mut Wallet,
    receiver: &mut Wallet,
    amount: u64,
) -> Result<LedgerEntry, LedgerError> {
    transfer(sender, receiver, amount, &AssetSymbol::merit())
}

/// A wallet paying itself. Balances end where they started, the nonce
/// advances, and an entry with `sender == receiver` is produced.
///
/// # Errors
///
/// Same as [`transfer`], minus overflow (debit-then-credit on one balance
/// can't exceed where it began).
pub fn self_transfer(
    wallet: &mut Wallet,
    amount: u64,
    asset: &AssetSymbol,
) -> Result<LedgerEntry, LedgerError> {
    wallet.debit(asset, amount)?;
    wallet.credit(asset, amount)?;
    LedgerEntry::new(wallet.id(), wallet.id(), amount, asset.clone())
}
