//! # Ledger Journal
//!
//! The append-only sequence of [`LedgerEntry`] records. Each appended entry
//! is wrapped in a [`LedgerRecord`] carrying its sequence number and a
//! chain hash that commits to every record before it. Both inputs are the
//! lowercase hex strings stored on the records, hashed as UTF-8:
//!
//! ```text
//! chain_hash[n]  = hex(BLAKE3-derive-key(CONTEXT, chain_hash[n-1] || entry[n].hash))
//! chain_hash[-1] = "00" * 32
//! ```
//!
//! Rewriting any historic entry therefore breaks its own hash check *and*
//! every chain link after it. [`Ledger::verify`] walks the whole journal
//! and reports the first record that fails.
//!
//! Appends happen under a write lock, so sequence numbers are gap-free and
//! chain links are computed against the true predecessor even under
//! concurrent writers.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::entry::LedgerEntry;
use crate::config::LEDGER_CHAIN_CONTEXT;
use crate::crypto::hash::domain_separated_hash;
use crate::error::LedgerError;

/// Chain link of the (nonexistent) record before sequence 0.
pub const GENESIS_CHAIN_HASH: [u8; 32] = [0u8; 32];

/// A journaled entry together with its position and chain link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// 0-based position in the journal.
    pub sequence: u64,
    /// The recorded transfer.
    pub entry: LedgerEntry,
    /// Hex chain hash of the previous record (zeros for the first).
    pub prev_hash: String,
    /// Hex chain hash of this record.
    pub chain_hash: String,
}

/// Thread-safe, append-only journal of ledger entries.
#[derive(Debug, Default)]
pub struct Ledger {
    records: RwLock<Vec<LedgerRecord>>,
}

impl Ledger {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns the resulting record.
    pub fn append(&self, entry: LedgerEntry) -> LedgerRecord {
        let mut records = self.records.write();

        let prev = records
            .last()
            .map(|r| r.chain_hash.clone())
            .unwrap_or_else(|| hex::encode(GENESIS_CHAIN_HASH));
        let chain_hash = chain_link(&prev, entry.hash());
        let record = LedgerRecord {
            sequence: records.len() as u64,
            entry,
            prev_hash: prev,
            chain_hash,
        };

        tracing::debug!(
            sequence = record.sequence,
            hash = %record.entry.hash(),
            "ledger append"
        );
        records.push(record.clone());
        record
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if nothing has been journaled yet.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Record at `sequence`, if any.
    pub fn get(&self, sequence: u64) -> Option<LedgerRecord> {
        let index = usize::try_from(sequence).ok()?;
        self.records.read().get(index).cloned()
    }

    /// Snapshot of every record in sequence order.
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.read().clone()
    }

    /// Records where `wallet_id` is sender or receiver, in sequence order.
    pub fn records_for(&self, wallet_id: &str) -> Vec<LedgerRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.entry.involves(wallet_id))
            .cloned()
            .collect()
    }

    /// Chain hash of the latest record, or the genesis link when empty.
    pub fn head_hash(&self) -> String {
        self.records
            .read()
            .last()
            .map(|r| r.chain_hash.clone())
            .unwrap_or_else(|| hex::encode(GENESIS_CHAIN_HASH))
    }

    /// Re-checks every entry hash and every chain link.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IntegrityViolation`] naming the first record
    /// that doesn't check out.
    pub fn verify(&self) -> Result<(), LedgerError> {
        verify_records(&self.records.read())
    }
}

/// Verifies an exported slice of records, e.g. one loaded from an audit
/// dump. Same rules as [`Ledger::verify`].
pub fn verify_records(records: &[LedgerRecord]) -> Result<(), LedgerError> {
    let mut expected_prev = hex::encode(GENESIS_CHAIN_HASH);

    for (index, record) in records.iter().enumerate() {
        let violation = |reason: &str| LedgerError::IntegrityViolation {
            sequence: record.sequence,
            reason: reason.to_string(),
        };

        if record.sequence != index as u64 {
            return Err(violation("sequence number out of order"));
        }
        if !record.entry.verify() {
            return Err(violation("entry hash does not match its fields"));
        }
        if record.prev_hash != expected_prev {
            return Err(violation("previous chain hash does not match"));
        }
        if record.chain_hash != chain_link(&record.prev_hash, record.entry.hash()) {
            return Err(violation("chain hash does not match"));
        }
        expected_prev = record.chain_hash.clone();
    }

    Ok(())
}

fn chain_link(prev_hex: &str, entry_hash_hex: &str) -> String {
    hex::encode(domain_separated_hash(
        LEDGER_CHAIN_CONTEXT,
        &[prev_hex.as_bytes(), entry_hash_hex.as_bytes()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::asset::AssetSymbol;
    use std::sync::Arc;

    fn entry(sender: &str, receiver: &str, amount: u64) -> LedgerEntry {
        LedgerEntry::new(sender, receiver, amount, AssetSymbol::merit()).unwrap()
    }

    #[test]
    fn empty_ledger_verifies() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert!(ledger.verify().is_ok());
        assert_eq!(ledger.head_hash(), hex::encode(GENESIS_CHAIN_HASH));
    }

    #[test]
    fn append_assigns_sequences_and_links() {
        let ledger = Ledger::new();
        let first = ledger.append(entry("a", "b", 1));
        let second = ledger.append(entry("b", "c", 2));

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(first.prev_hash, hex::encode(GENESIS_CHAIN_HASH));
        assert_eq!(second.prev_hash, first.chain_hash);
        assert_eq!(ledger.head_hash(), second.chain_hash);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn chain_link_hashes_the_stored_hex_strings() {
        let ledger = Ledger::new();
        let record = ledger.append(entry("a", "b", 1));

        let mut hasher = blake3::Hasher::new_derive_key(LEDGER_CHAIN_CONTEXT);
        hasher.update("0".repeat(64).as_bytes());
        hasher.update(record.entry.hash().as_bytes());
        assert_eq!(record.chain_hash, hasher.finalize().to_hex().to_string());
    }

    #[test]
    fn get_and_filter() {
        let ledger = Ledger::new();
        ledger.append(entry("a", "b", 1));
        ledger.append(entry("c", "d", 2));
        ledger.append(entry("b", "c", 3));

        assert_eq!(ledger.get(1).unwrap().entry.amount(), 2);
        assert!(ledger.get(3).is_none());

        let for_b: Vec<u64> = ledger
            .records_for("b")
            .iter()
            .map(|r| r.entry.amount())
            .collect();
        assert_eq!(for_b, vec![1, 3]);
    }

    #[test]
    fn tampered_entry_is_detected() {
        let ledger = Ledger::new();
        ledger.append(entry("a", "b", 10));
        ledger.append(entry("b", "c", 5));

        let mut records = ledger.records();
        let mut forged = serde_json::to_value(&records[0].entry).unwrap();
        forged["amount"] = serde_json::json!(1_000);
        records[0].entry = serde_json::from_value(forged).unwrap();

        let err = verify_records(&records).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::IntegrityViolation { sequence: 0, .. }
        ));
    }

    #[test]
    fn rewritten_history_breaks_the_chain() {
        let ledger = Ledger::new();
        ledger.append(entry("a", "b", 10));
        ledger.append(entry("b", "c", 5));
        ledger.append(entry("c", "a", 1));

        // Replace record 1 with a self-consistent entry; record 2's link
        // still points at the original.
        let mut records = ledger.records();
        let replacement = Ledger::new();
        replacement.append(entry("x", "y", 1));
        let fake = replacement.append(entry("b", "c", 5_000));
        records[1].entry = fake.entry;
        records[1].chain_hash = chain_link(&records[1].prev_hash, records[1].entry.hash());

        let err = verify_records(&records).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::IntegrityViolation { sequence: 2, .. }
        ));
    }

    #[test]
    fn dropped_record_is_detected() {
        let ledger = Ledger::new();
        ledger.append(entry("a", "b", 1));
        ledger.append(entry("a", "b", 2));
        let mut records = ledger.records();
        records.remove(0);

        assert!(verify_records(&records).is_err());
    }

    #[test]
    fn concurrent_appends_stay_gap_free() {
        let ledger = Arc::new(Ledger::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        ledger.append(entry(&format!("w{t}"), "sink", i + 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ledger.len(), 400);
        assert!(ledger.verify().is_ok());
    }
}
