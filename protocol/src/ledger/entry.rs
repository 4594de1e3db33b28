//! # Ledger Entries
//!
//! A [`LedgerEntry`] records one movement of value between two wallet
//! identifiers. It is built once, hashes itself at construction, and has
//! no setters.
//!
//! ## Canonical hash encoding (v1)
//!
//! The entry hash is the lowercase hex SHA-256 of five fields, in this
//! order:
//!
//! ```text
//! sender || receiver || amount || asset || timestamp
//! ```
//!
//! Each field is framed as a 4-byte big-endian byte length followed by its
//! UTF-8 bytes. `amount` is its base-10 decimal string. `timestamp` is
//! RFC 3339 in UTC with nanosecond precision and a `Z` suffix, for example
//! `2026-01-02T03:04:05.000000006Z`. Any reimplementation that follows
//! these rules reproduces our hashes byte for byte.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_fields;
use crate::error::LedgerError;
use crate::vault::asset::AssetSymbol;

/// An immutable, self-hashing transfer record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    sender: String,
    receiver: String,
    amount: u64,
    asset: AssetSymbol,
    timestamp: DateTime<Utc>,
    hash: String,
}

impl LedgerEntry {
    /// Builds an entry stamped with the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is 0.
    pub fn new(
        sender: &str,
        receiver: &str,
        amount: u64,
        asset: AssetSymbol,
    ) -> Result<Self, LedgerError> {
        Self::at(sender, receiver, amount, asset, Utc::now())
    }

    /// Builds an entry with an explicit timestamp. Auditors use this to
    /// reproduce an entry from its recorded fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is 0.
    pub fn at(
        sender: &str,
        receiver: &str,
        amount: u64,
        asset: AssetSymbol,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "ledger entry amount must be greater than zero".to_string(),
            ));
        }

        let hash = canonical_hash(sender, receiver, amount, &asset, &timestamp);
        Ok(Self {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            asset,
            timestamp,
            hash,
        })
    }

    /// Recomputes the digest from the five recorded fields.
    pub fn compute_hash(&self) -> String {
        canonical_hash(
            &self.sender,
            &self.receiver,
            self.amount,
            &self.asset,
            &self.timestamp,
        )
    }

    /// Returns `true` if the stored hash matches the recorded fields.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn asset(&self) -> &AssetSymbol {
        &self.asset
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Hex SHA-256 digest fixed at construction.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns `true` if `wallet_id` is the sender or the receiver.
    pub fn involves(&self, wallet_id: &str) -> bool {
        self.sender == wallet_id || self.receiver == wallet_id
    }
}

/// Canonical timestamp rendering used in the hash preimage.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn canonical_hash(
    sender: &str,
    receiver: &str,
    amount: u64,
    asset: &AssetSymbol,
    timestamp: &DateTime<Utc>,
) -> String {
    let amount = amount.to_string();
    let timestamp = canonical_timestamp(timestamp);
    let digest = sha256_fields(&[
        sender.as_bytes(),
        receiver.as_bytes(),
        amount.as_bytes(),
        asset.as_str().as_bytes(),
        timestamp.as_bytes(),
    ]);
    hex::encode(digest)
}
