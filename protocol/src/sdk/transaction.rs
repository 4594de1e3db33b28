//! # Partner Transactions
//!
//! The entry point partners integrate against. A partner reports that one
//! of its users spent `amount_usd`; merit is issued at the partner's reward
//! rate into the user's wallet and journaled, and the caller gets back a
//! [`TransactionRecord`] to store or forward.
//!
//! Issuance goes through [`Accounting::issue`], so partner mints obey the
//! same rules as every other one: supply only grows together with a wallet
//! balance and a journal record. A user without a wallet gets one opened
//! under their id on first purchase.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounting::Accounting;
use crate::error::LedgerError;
use crate::identity::validate_identifier;

// ---------------------------------------------------------------------------
// TransactionRecord
// ---------------------------------------------------------------------------

/// What a processed partner transaction produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction identifier (UUIDv4).
    pub tx_id: String,
    pub partner_id: String,
    pub user_id: String,
    /// Purchase value reported by the partner.
    pub amount_usd: f64,
    /// Partner factor applied to the mint.
    pub reward_rate: f64,
    /// Units minted and credited to `user_id`.
    pub merit_generated: u64,
    /// Journal sequence of the issuance; `None` when nothing was minted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_sequence: Option<u64>,
    /// When the record was issued.
    pub timestamp: DateTime<Utc>,
}

/// Issues merit to `user_id` for one partner transaction and returns its
/// record.
///
/// # Errors
///
/// - [`LedgerError::InvalidIdentifier`] if either id is malformed or
///   `user_id` is reserved.
/// - Anything [`Accounting::issue`] reports for `amount_usd` or
///   `reward_rate`. Supply, balances and the journal are unchanged on error.
pub fn process_transaction(
    accounting: &Accounting,
    partner_id: &str,
    user_id: &str,
    amount_usd: f64,
    reward_rate: f64,
) -> Result<TransactionRecord, LedgerError> {
    validate_identifier(partner_id)?;
    ensure_user_wallet(accounting, user_id)?;

    let issuance = accounting.issue(user_id, amount_usd, reward_rate)?;
    let record = TransactionRecord {
        tx_id: Uuid::new_v4().to_string(),
        partner_id: partner_id.to_string(),
        user_id: user_id.to_string(),
        amount_usd,
        reward_rate,
        merit_generated: issuance.minted,
        ledger_sequence: issuance.record.map(|r| r.sequence),
        timestamp: Utc::now(),
    };

    tracing::info!(
        tx_id = %record.tx_id,
        partner = partner_id,
        user = user_id,
        amount_usd,
        merit_generated = record.merit_generated,
        "partner transaction processed"
    );
    Ok(record)
}

/// Opens `user_id`'s wallet unless it already exists. Losing the race to a
/// concurrent opener is fine.
fn ensure_user_wallet(accounting: &Accounting, user_id: &str) -> Result<(), LedgerError> {
    if accounting.wallets().contains(user_id) {
        return Ok(());
    }
    match accounting.open_wallet(user_id) {
        Ok(_) | Err(LedgerError::DuplicateWallet(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// PartnerClient
// ---------------------------------------------------------------------------

/// A partner's bound view of the accounting core: fixed id and reward rate.
#[derive(Clone, Debug)]
pub struct PartnerClient {
    partner_id: String,
    reward_rate: f64,
    accounting: Arc<Accounting>,
}

impl PartnerClient {
    /// # Errors
    ///
    /// [`LedgerError::InvalidIdentifier`] for a malformed partner id and
    /// [`LedgerError::InvalidAmount`] unless `reward_rate` is finite and
    /// positive.
    pub fn new(
        partner_id: &str,
        reward_rate: f64,
        accounting: Arc<Accounting>,
    ) -> Result<Self, LedgerError> {
        validate_identifier(partner_id)?;
        if !reward_rate.is_finite() || reward_rate <= 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "reward rate must be finite and positive, got {reward_rate}"
            )));
        }
        Ok(Self {
            partner_id: partner_id.to_string(),
            reward_rate,
            accounting,
        })
    }

    pub fn partner_id(&self) -> &str {
        &self.partner_id
    }

    pub fn reward_rate(&self) -> f64 {
        self.reward_rate
    }

    /// Processes a transaction for `user_id` at this partner's rate.
    pub fn process(&self, user_id: &str, amount_usd: f64) -> Result<TransactionRecord, LedgerError> {
        process_transaction(
            &self.accounting,
            &self.partner_id,
            user_id,
            amount_usd,
            self.reward_rate,
        )
    }
}
