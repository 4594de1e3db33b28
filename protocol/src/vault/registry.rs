//! Concurrent wallet registry.
//!
//! Wallets are keyed by id in a `DashMap`, each behind its own
//! `parking_lot::Mutex`. Lookups never hold a map shard while a wallet lock
//! is taken: the `Arc` is cloned out first and the shard guard dropped.
//!
//! ## Lock Ordering
//!
//! A transfer needs both wallets at once. To rule out deadlock between
//! `A -> B` and `B -> A` running concurrently, the two mutexes are always
//! acquired in ascending id order, whichever side is the sender. A wallet
//! paying itself takes its single lock once.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::asset::AssetSymbol;
use super::transfer::{self_transfer, transfer};
use super::wallet::{ensure_not_reserved, Wallet};
use crate::error::LedgerError;
use crate::ledger::LedgerEntry;

type WalletHandle = Arc<Mutex<Wallet>>;

/// Shared store of every open wallet.
#[derive(Debug, Default)]
pub struct WalletRegistry {
    wallets: DashMap<String, WalletHandle>,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a wallet for `id` and returns a snapshot of it.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidIdentifier`] for a malformed id and
    /// [`LedgerError::DuplicateWallet`] if `id` is already open.
    pub fn create(&self, id: &str) -> Result<Wallet, LedgerError> {
        let wallet = Wallet::new(id)?;
        self.insert(wallet.clone())?;
        Ok(wallet)
    }

    /// Opens a wallet under a freshly generated uid.
    pub fn create_generated(&self) -> Result<Wallet, LedgerError> {
        let wallet = Wallet::generate();
        self.insert(wallet.clone())?;
        Ok(wallet)
    }

    /// Adds an existing wallet.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidIdentifier`] for the reserved issuer id and
    /// [`LedgerError::DuplicateWallet`] if a wallet with the same id exists.
    pub fn insert(&self, wallet: Wallet) -> Result<(), LedgerError> {
        ensure_not_reserved(wallet.id())?;
        match self.wallets.entry(wallet.id().to_string()) {
            Entry::Occupied(occupied) => Err(LedgerError::DuplicateWallet(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                tracing::debug!(wallet = %wallet.id(), "wallet opened");
                vacant.insert(Arc::new(Mutex::new(wallet)));
                Ok(())
            }
        }
    }

    /// Point-in-time copy of a wallet.
    pub fn get(&self, id: &str) -> Option<Wallet> {
        self.handle(id).ok().map(|h| h.lock().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.wallets.contains_key(id)
    }

    /// Number of open wallets.
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Every wallet id, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.wallets.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Credits `amount` of `asset` to wallet `id` and returns the new
    /// balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::WalletNotFound`], plus anything [`Wallet::credit`]
    /// returns.
    pub fn credit(&self, id: &str, asset: &AssetSymbol, amount: u64) -> Result<u64, LedgerError> {
        let handle = self.handle(id)?;
        let mut wallet = handle.lock();
        wallet.credit(asset, amount)
    }

    /// Runs `f` against wallet `id` while holding its lock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::WalletNotFound`], or whatever `f` returns.
    pub fn with_wallet<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Wallet) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let handle = self.handle(id)?;
        let mut wallet = handle.lock();
        f(&mut wallet)
    }

    /// Atomically moves `amount` of `asset` between two registered wallets.
    ///
    /// Holds both wallet locks for the full check-debit-credit sequence, so
    /// no observer can see the debit without the credit.
    ///
    /// # Errors
    ///
    /// [`LedgerError::WalletNotFound`] if either id is unknown, otherwise
    /// whatever the underlying [`transfer`] reports. Neither wallet changes
    /// on error.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        asset: &AssetSymbol,
    ) -> Result<LedgerEntry, LedgerError> {
        self.transfer_with(from, to, amount, asset, |entry| entry)
    }

    /// [`transfer`](Self::transfer), then `commit` on the resulting entry
    /// before either wallet lock is released.
    ///
    /// Any other operation touching `from` or `to` runs entirely before or
    /// entirely after `commit`, so a journal appended from `commit` lists
    /// changes to each wallet in the order they were applied.
    pub fn transfer_with<R>(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        asset: &AssetSymbol,
        commit: impl FnOnce(LedgerEntry) -> R,
    ) -> Result<R, LedgerError> {
        let sender = self.handle(from)?;
        let receiver = self.handle(to)?;

        if from == to {
            let mut wallet = sender.lock();
            return self_transfer(&mut wallet, amount, asset).map(commit);
        }

        // Acquire in id order; map back to sender/receiver afterwards.
        let (first, second) = if from < to {
            (&sender, &receiver)
        } else {
            (&receiver, &sender)
        };
        let mut first_guard = first.lock();
        let mut second_guard = second.lock();

        let entry = if from < to {
            transfer(&mut first_guard, &mut second_guard, amount, asset)
        } else {
            transfer(&mut second_guard, &mut first_guard, amount, asset)
        }?;
        Ok(commit(entry))
    }

    fn handle(&self, id: &str) -> Result<WalletHandle, LedgerError> {
        self.wallets
            .get(id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))
    }
}
