//! # Accounting
//!
//! [`Accounting`] ties the pieces together: a [`WalletRegistry`] for
//! balances, a [`Ledger`] journal for audit, and a [`MeritEngine`] for
//! issuance. It is an owned value. Embedders create one and share it
//! (the node wraps it in an `Arc`); nothing here is global.
//!
//! Every successful transfer or non-zero issuance lands in the journal.
//! The append happens while the wallet locks are still held, so journal
//! order is the order in which balances actually changed. Rejected
//! operations are logged at `warn` and returned to the caller with both the
//! wallets and the journal untouched.
//!
//! Lock order is always wallets first, then the journal. The journal never
//! reaches back into the registry.

use serde::Serialize;

use crate::config::MINT_ISSUER_ID;
use crate::error::LedgerError;
use crate::ledger::{Ledger, LedgerEntry, LedgerRecord};
use crate::merit::MeritEngine;
use crate::vault::{AssetSymbol, Wallet, WalletRegistry};

/// Result of [`Accounting::issue`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issuance {
    /// Units minted and credited. May be 0.
    pub minted: u64,
    /// The journal record for the credit; `None` when nothing was minted.
    pub record: Option<LedgerRecord>,
}

/// Wallets, journal and mint behind one handle.
#[derive(Debug, Default)]
pub struct Accounting {
    wallets: WalletRegistry,
    ledger: Ledger,
    engine: MeritEngine,
}

impl Accounting {
    pub fn new(engine: MeritEngine) -> Self {
        Self {
            wallets: WalletRegistry::new(),
            ledger: Ledger::new(),
            engine,
        }
    }

    // -----------------------------------------------------------------------
    // Wallets
    // -----------------------------------------------------------------------

    /// Opens a wallet under a caller-chosen id.
    pub fn open_wallet(&self, id: &str) -> Result<Wallet, LedgerError> {
        self.wallets.create(id).map_err(|e| {
            tracing::warn!(wallet = id, error = %e, "wallet open rejected");
            e
        })
    }

    /// Opens a wallet under a generated uid.
    pub fn open_generated_wallet(&self) -> Result<Wallet, LedgerError> {
        self.wallets.create_generated()
    }

    /// Snapshot of a wallet.
    pub fn wallet(&self, id: &str) -> Result<Wallet, LedgerError> {
        self.wallets
            .get(id)
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))
    }

    pub fn wallets(&self) -> &WalletRegistry {
        &self.wallets
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn engine(&self) -> &MeritEngine {
        &self.engine
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Moves value between two open wallets and journals the entry.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: u64,
        asset: &AssetSymbol,
    ) -> Result<LedgerRecord, LedgerError> {
        match self
            .wallets
            .transfer_with(from, to, amount, asset, |entry| self.ledger.append(entry))
        {
            Ok(record) => {
                tracing::info!(
                    from,
                    to,
                    amount,
                    %asset,
                    sequence = record.sequence,
                    "transfer recorded"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(from, to, amount, %asset, error = %e, "transfer rejected");
                Err(e)
            }
        }
    }

    /// Mints merit for `usd_value` and credits it to `receiver`.
    ///
    /// The mint, the credit and the journal append happen under the
    /// receiver's lock, after the credit has been checked, so supply never
    /// grows without a matching balance and record. A zero mint succeeds
    /// without a journal entry.
    ///
    /// # Errors
    ///
    /// [`LedgerError::WalletNotFound`] for an unknown receiver, plus
    /// anything [`MeritEngine::mint`] or [`Wallet::credit`] reports.
    pub fn issue(
        &self,
        receiver: &str,
        usd_value: f64,
        partner_factor: f64,
    ) -> Result<Issuance, LedgerError> {
        let merit = AssetSymbol::merit();
        let result = self.wallets.with_wallet(receiver, |wallet| {
            let quoted = self.engine.quote(usd_value, partner_factor)?;
            if quoted == 0 {
                return Ok(None);
            }
            wallet.check_credit(&merit, quoted)?;
            let entry = LedgerEntry::new(MINT_ISSUER_ID, wallet.id(), quoted, merit.clone())?;
            let minted = self.engine.mint(usd_value, partner_factor)?;
            wallet.credit(&merit, minted)?;
            Ok(Some(self.ledger.append(entry)))
        });

        match result {
            Ok(Some(record)) => {
                let minted = record.entry.amount();
                tracing::info!(
                    receiver,
                    usd_value,
                    partner_factor,
                    minted,
                    total_supply = self.engine.total_supply(),
                    "merit issued"
                );
                Ok(Issuance {
                    minted,
                    record: Some(record),
                })
            }
            Ok(None) => Ok(Issuance {
                minted: 0,
                record: None,
            }),
            Err(e) => {
                tracing::warn!(receiver, usd_value, partner_factor, error = %e, "issuance rejected");
                Err(e)
            }
        }
    }

    /// Checks every journal record.
    pub fn verify_ledger(&self) -> Result<(), LedgerError> {
        self.ledger.verify()
    }
}
