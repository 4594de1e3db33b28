//! End-to-end tests for the OmniUtil accounting core.
//!
//! The scenario tests walk wallets, transfers, issuance and the journal
//! through the public API only. The property tests throw random operation
//! sequences at the same API and check that balances, supply and the
//! journal stay consistent whatever happens.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use omniutil_protocol::accounting::Accounting;
use omniutil_protocol::config::MINT_ISSUER_ID;
use omniutil_protocol::ledger::{verify_records, LedgerEntry, LedgerRecord};
use omniutil_protocol::merit::MeritEngine;
use omniutil_protocol::sdk::PartnerClient;
use omniutil_protocol::vault::{transfer, AssetSymbol, Wallet};
use omniutil_protocol::LedgerError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn merit() -> AssetSymbol {
    AssetSymbol::merit()
}

/// Rebuilds MERIT balances by applying `records` in sequence order from
/// zero. Issuance entries credit without a debit. Panics if any prefix of
/// the journal would overdraw a wallet.
fn replay(records: &[LedgerRecord]) -> HashMap<String, u64> {
    let mut balances: HashMap<String, u64> = HashMap::new();
    for record in records {
        let entry = &record.entry;
        if entry.sender() != MINT_ISSUER_ID {
            let held = balances.get(entry.sender()).copied().unwrap_or(0);
            assert!(
                held >= entry.amount(),
                "record {} overdraws {}: holds {held}, sends {}",
                record.sequence,
                entry.sender(),
                entry.amount()
            );
            balances.insert(entry.sender().to_string(), held - entry.amount());
        }
        *balances.entry(entry.receiver().to_string()).or_default() += entry.amount();
    }
    balances
}

fn funded(id: &str, amount: u64) -> Wallet {
    let mut wallet = Wallet::new(id).unwrap();
    if amount > 0 {
        wallet.credit(&merit(), amount).unwrap();
    }
    wallet
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn transfer_then_overdraft() {
    let mut a = funded("A", 100);
    let mut b = funded("B", 0);

    let entry = transfer(&mut a, &mut b, 30, &merit()).unwrap();
    assert_eq!(a.balance(&merit()), 70);
    assert_eq!(b.balance(&merit()), 30);
    assert_eq!(entry.hash().len(), 64);
    assert!(entry.verify());

    let before = (a.clone(), b.clone());
    let err = transfer(&mut a, &mut b, 1_000, &merit()).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance { available: 70, requested: 1_000, .. }
    ));
    assert_eq!((a, b), before);
}

#[test]
fn entry_hash_is_reproducible_from_recorded_fields() {
    let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let original = LedgerEntry::at("alice", "bob", 42, merit(), ts).unwrap();
    let replayed = LedgerEntry::at(
        original.sender(),
        original.receiver(),
        original.amount(),
        original.asset().clone(),
        original.timestamp(),
    )
    .unwrap();
    assert_eq!(original.hash(), replayed.hash());

    let other_amount = LedgerEntry::at("alice", "bob", 43, merit(), ts).unwrap();
    let other_time =
        LedgerEntry::at("alice", "bob", 42, merit(), ts + chrono::Duration::seconds(1)).unwrap();
    assert_ne!(original.hash(), other_amount.hash());
    assert_ne!(original.hash(), other_time.hash());
}

#[test]
fn merit_worked_example() {
    let engine = MeritEngine::new(2.0).unwrap();
    assert_eq!(engine.mint(10.0, 1.5).unwrap(), 30);
    assert_eq!(engine.total_supply(), 30);
}

#[test]
fn full_flow_through_accounting() {
    let acct = Accounting::new(MeritEngine::new(1.0).unwrap());
    for id in ["shop", "alice", "bob"] {
        acct.open_wallet(id).unwrap();
    }

    acct.issue("alice", 120.0, 1.0).unwrap();
    acct.transfer("alice", "bob", 20, &merit()).unwrap();
    acct.transfer("bob", "shop", 5, &merit()).unwrap();

    let records = acct.ledger().records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].entry.sender(), MINT_ISSUER_ID);
    assert!(verify_records(&records).is_ok());

    assert_eq!(acct.ledger().records_for("bob").len(), 2);
    assert_eq!(acct.wallet("alice").unwrap().balance(&merit()), 100);
    assert_eq!(acct.wallet("bob").unwrap().balance(&merit()), 15);
    assert_eq!(acct.wallet("shop").unwrap().balance(&merit()), 5);
    assert_eq!(acct.engine().total_supply(), 120);
}

#[test]
fn tampered_journal_is_detected() {
    let acct = Accounting::new(MeritEngine::new(1.0).unwrap());
    acct.open_wallet("alice").unwrap();
    acct.open_wallet("bob").unwrap();
    acct.issue("alice", 10.0, 1.0).unwrap();
    acct.transfer("alice", "bob", 4, &merit()).unwrap();

    let mut records = acct.ledger().records();
    let forged = LedgerEntry::at(
        "alice",
        "bob",
        400,
        merit(),
        records[1].entry.timestamp(),
    )
    .unwrap();
    records[1].entry = forged;

    assert!(matches!(
        verify_records(&records),
        Err(LedgerError::IntegrityViolation { sequence: 1, .. })
    ));
}

#[test]
fn partner_clients_share_one_accounting_core() {
    let acct = Arc::new(Accounting::new(MeritEngine::new(2.0).unwrap()));
    let cafe = PartnerClient::new("cafe", 1.5, Arc::clone(&acct)).unwrap();
    let books = PartnerClient::new("books", 0.5, Arc::clone(&acct)).unwrap();

    assert_eq!(cafe.process("u1", 10.0).unwrap().merit_generated, 30);
    assert_eq!(books.process("u2", 10.0).unwrap().merit_generated, 10);
    assert_eq!(books.process("u1", 4.0).unwrap().merit_generated, 4);

    assert_eq!(acct.engine().total_supply(), 44);
    assert_eq!(acct.wallet("u1").unwrap().balance(&merit()), 34);
    assert_eq!(acct.wallet("u2").unwrap().balance(&merit()), 10);

    let journaled: u64 = acct.ledger().records().iter().map(|r| r.entry.amount()).sum();
    assert_eq!(journaled, 44);
    assert!(acct.verify_ledger().is_ok());
}

#[test]
fn concurrent_partner_traffic_keeps_supply_wallets_and_journal_equal() {
    let acct = Arc::new(Accounting::new(MeritEngine::new(1.0).unwrap()));
    let handles: Vec<_> = (0..4)
        .map(|p| {
            let client = PartnerClient::new(&format!("partner-{p}"), 1.0, Arc::clone(&acct)).unwrap();
            std::thread::spawn(move || {
                for i in 0..50 {
                    client.process(&format!("user-{}", i % 5), 2.0).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let held: u64 = acct
        .wallets()
        .ids()
        .iter()
        .map(|id| acct.wallet(id).unwrap().balance(&merit()))
        .sum();
    let journaled: u64 = acct.ledger().records().iter().map(|r| r.entry.amount()).sum();
    assert_eq!(acct.engine().total_supply(), 4 * 50 * 2);
    assert_eq!(held, acct.engine().total_supply());
    assert_eq!(journaled, acct.engine().total_supply());
    assert_eq!(acct.wallets().len(), 5);
}

#[test]
fn concurrent_chained_transfers_replay_in_journal_order() {
    let acct = Arc::new(Accounting::new(MeritEngine::new(1.0).unwrap()));
    for id in ["a", "b", "c"] {
        acct.open_wallet(id).unwrap();
    }
    acct.issue("a", 500.0, 1.0).unwrap();

    // a -> b and b -> c race; b only ever spends what a already sent it.
    let hops = [("a", "b"), ("b", "c")];
    let handles: Vec<_> = hops
        .into_iter()
        .map(|(from, to)| {
            let acct = Arc::clone(&acct);
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let _ = acct.transfer(from, to, 1, &AssetSymbol::merit());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let records = acct.ledger().records();
    assert!(verify_records(&records).is_ok());

    let replayed = replay(&records);
    for id in ["a", "b", "c"] {
        assert_eq!(
            replayed.get(id).copied().unwrap_or(0),
            acct.wallet(id).unwrap().balance(&merit()),
            "replayed balance of {id}"
        );
    }
}

#[test]
fn concurrent_issue_and_transfer_keep_supply_in_wallets() {
    let acct = Arc::new(Accounting::new(MeritEngine::new(1.0).unwrap()));
    let ids = ["w0", "w1", "w2", "w3"];
    for id in ids {
        acct.open_wallet(id).unwrap();
    }

    let handles: Vec<_> = (0..ids.len())
        .map(|i| {
            let acct = Arc::clone(&acct);
            std::thread::spawn(move || {
                let me = ids[i];
                let next = ids[(i + 1) % ids.len()];
                for _ in 0..100 {
                    acct.issue(me, 3.0, 1.0).unwrap();
                    let _ = acct.transfer(me, next, 2, &AssetSymbol::merit());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let held: u64 = ids
        .iter()
        .map(|id| acct.wallet(id).unwrap().balance(&merit()))
        .sum();
    assert_eq!(held, acct.engine().total_supply());
    assert_eq!(held, 4 * 100 * 3);
    assert!(acct.verify_ledger().is_ok());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Issue { to: usize, usd: u32 },
    Transfer { from: usize, to: usize, amount: u64 },
}

const WALLETS: [&str; 3] = ["p0", "p1", "p2"];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..WALLETS.len(), 0u32..500).prop_map(|(to, usd)| Op::Issue { to, usd }),
        (0..WALLETS.len(), 0..WALLETS.len(), 0u64..800)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Debit never takes a balance below zero; a failed one changes nothing.
    #[test]
    fn debit_never_goes_negative(start in 0u64..10_000, amounts in prop::collection::vec(0u64..3_000, 1..20)) {
        let mut wallet = funded("w", start);
        let mut expected = start;
        for amount in amounts {
            let before = wallet.clone();
            match wallet.debit(&merit(), amount) {
                Ok(remaining) => {
                    prop_assert!(amount > 0 && amount <= expected);
                    expected -= amount;
                    prop_assert_eq!(remaining, expected);
                }
                Err(_) => prop_assert_eq!(&wallet, &before),
            }
            prop_assert_eq!(wallet.balance(&merit()), expected);
        }
    }

    /// A transfer either conserves the pair total or leaves both wallets
    /// untouched.
    #[test]
    fn transfer_conserves_pair_total(a in 0u64..1_000_000, b in 0u64..1_000_000, amount in 0u64..2_000_000) {
        let mut sender = funded("s", a);
        let mut receiver = funded("r", b);
        let before = (sender.clone(), receiver.clone());

        match transfer(&mut sender, &mut receiver, amount, &merit()) {
            Ok(entry) => {
                prop_assert_eq!(entry.amount(), amount);
                prop_assert_eq!(sender.balance(&merit()), a - amount);
                prop_assert_eq!(receiver.balance(&merit()), b + amount);
            }
            Err(_) => prop_assert_eq!((sender, receiver), before),
        }
    }

    /// Supply equals the sum of individual mints and never decreases.
    #[test]
    fn supply_is_sum_of_mints(calls in prop::collection::vec((0.0f64..10_000.0, 0.1f64..5.0), 1..30)) {
        let engine = MeritEngine::new(1.5).unwrap();
        let mut sum = 0u64;
        let mut last = 0u64;
        for (usd, factor) in calls {
            let minted = engine.mint(usd, factor).unwrap();
            prop_assert_eq!(minted, (usd * 1.5 * factor).trunc() as u64);
            sum += minted;
            prop_assert!(engine.total_supply() >= last);
            last = engine.total_supply();
        }
        prop_assert_eq!(engine.total_supply(), sum);
    }

    /// Across any sequence of issues and transfers, wallets hold exactly
    /// the minted supply and the journal verifies.
    #[test]
    fn accounting_stays_balanced(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let acct = Accounting::new(MeritEngine::new(1.0).unwrap());
        for id in WALLETS {
            acct.open_wallet(id).unwrap();
        }

        let mut successes = 0usize;
        for op in ops {
            match op {
                Op::Issue { to, usd } => {
                    let issued = acct.issue(WALLETS[to], f64::from(usd), 1.0).unwrap();
                    if issued.minted > 0 {
                        successes += 1;
                    }
                }
                Op::Transfer { from, to, amount } => {
                    if acct.transfer(WALLETS[from], WALLETS[to], amount, &merit()).is_ok() {
                        successes += 1;
                    }
                }
            }
        }

        let held: u64 = WALLETS
            .iter()
            .map(|id| acct.wallet(id).unwrap().balance(&merit()))
            .sum();
        prop_assert_eq!(held, acct.engine().total_supply());
        prop_assert_eq!(acct.ledger().len(), successes);
        prop_assert!(acct.verify_ledger().is_ok());

        let replayed = replay(&acct.ledger().records());
        for id in WALLETS {
            prop_assert_eq!(
                replayed.get(id).copied().unwrap_or(0),
                acct.wallet(id).unwrap().balance(&merit())
            );
        }
    }
}
