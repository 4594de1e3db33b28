//! # Merit Engine
//!
//! Converts a USD valuation into freshly minted `MERIT` units and keeps a
//! running total of everything it has ever issued.
//!
//! ```text
//! minted = trunc(usd_value × base_rate × partner_factor)
//! total_supply += minted
//! ```
//!
//! The product is computed in `f64` and truncated toward zero. Negative,
//! NaN or infinite valuations are rejected, so truncation only ever rounds
//! down. `total_supply` is an `AtomicU64` advanced with a single checked
//! compare-and-swap per mint; concurrent callers never lose an increment
//! and the counter never decreases.
//!
//! The engine does not touch wallets. Crediting the minted amount to
//! someone is the caller's job (see `Accounting::issue`).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{DEFAULT_BASE_RATE, DEFAULT_PARTNER_FACTOR};
use crate::error::LedgerError;

/// 2^64 as `f64`. Any product at or above this does not fit in a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Supply-tracking mint.
#[derive(Debug)]
pub struct MeritEngine {
    base_rate: f64,
    total_supply: AtomicU64,
}

impl MeritEngine {
    /// Creates an engine with zero supply.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAmount`] unless `base_rate` is finite and
    /// strictly positive.
    pub fn new(base_rate: f64) -> Result<Self, LedgerError> {
        if !base_rate.is_finite() || base_rate <= 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "base rate must be finite and positive, got {base_rate}"
            )));
        }
        Ok(Self {
            base_rate,
            total_supply: AtomicU64::new(0),
        })
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Cumulative units minted since construction.
    pub fn total_supply(&self) -> u64 {
        self.total_supply.load(Ordering::Acquire)
    }

    /// Mints units for `usd_value` scaled by `partner_factor` and returns the
    /// truncated amount. A result of 0 is valid and leaves supply unchanged.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `usd_value` is negative or not
    ///   finite, `partner_factor` is not finite and positive, or the scaled
    ///   value does not fit in a `u64`.
    /// - [`LedgerError::Overflow`] if the new supply would pass `u64::MAX`.
    ///
    /// Supply is unchanged on error.
    ///
    /// ```
    /// use omniutil_protocol::merit::MeritEngine;
    ///
    /// let engine = MeritEngine::new(2.0).unwrap();
    /// assert_eq!(engine.mint(10.0, 1.5).unwrap(), 30);
    /// assert_eq!(engine.total_supply(), 30);
    /// ```
    pub fn mint(&self, usd_value: f64, partner_factor: f64) -> Result<u64, LedgerError> {
        let minted = self.quote(usd_value, partner_factor)?;

        self.total_supply
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |supply| {
                supply.checked_add(minted)
            })
            .map_err(|current| LedgerError::Overflow {
                current,
                delta: minted,
            })?;

        tracing::debug!(usd_value, partner_factor, minted, "merit minted");
        Ok(minted)
    }

    /// The amount [`mint`](Self::mint) would return for these inputs,
    /// without touching supply.
    pub fn quote(&self, usd_value: f64, partner_factor: f64) -> Result<u64, LedgerError> {
        if !usd_value.is_finite() || usd_value < 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "usd value must be finite and non-negative, got {usd_value}"
            )));
        }
        if !partner_factor.is_finite() || partner_factor <= 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "partner factor must be finite and positive, got {partner_factor}"
            )));
        }

        let product = (usd_value * self.base_rate * partner_factor).trunc();
        if product >= U64_LIMIT {
            return Err(LedgerError::InvalidAmount(format!(
                "minted value {product} does not fit in u64"
            )));
        }
        Ok(product as u64)
    }

    /// [`mint`](Self::mint) with the neutral partner factor.
    pub fn mint_default(&self, usd_value: f64) -> Result<u64, LedgerError> {
        self.mint(usd_value, DEFAULT_PARTNER_FACTOR)
    }
}

impl Default for MeritEngine {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE,
            total_supply: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn worked_example() {
        let engine = MeritEngine::new(2.0).unwrap();
        assert_eq!(engine.mint(10.0, 1.5).unwrap(), 30);
        assert_eq!(engine.total_supply(), 30);
    }

    #[test]
    fn truncates_toward_zero() {
        let engine = MeritEngine::new(1.0).unwrap();
        assert_eq!(engine.mint(9.99, 1.0).unwrap(), 9);
        assert_eq!(engine.mint(0.5, 1.0).unwrap(), 0);
        assert_eq!(engine.total_supply(), 9);
    }

    #[test]
    fn zero_usd_mints_nothing() {
        let engine = MeritEngine::default();
        assert_eq!(engine.mint_default(0.0).unwrap(), 0);
        assert_eq!(engine.total_supply(), 0);
    }

    #[test]
    fn rejects_bad_inputs_without_touching_supply() {
        let engine = MeritEngine::new(1.0).unwrap();
        engine.mint_default(5.0).unwrap();

        for (usd, factor) in [
            (-1.0, 1.0),
            (f64::NAN, 1.0),
            (f64::INFINITY, 1.0),
            (1.0, 0.0),
            (1.0, -2.0),
            (1.0, f64::NAN),
        ] {
            assert!(matches!(
                engine.mint(usd, factor),
                Err(LedgerError::InvalidAmount(_))
            ));
        }
        assert_eq!(engine.total_supply(), 5);
    }

    #[test]
    fn quote_matches_mint_and_is_side_effect_free() {
        let engine = MeritEngine::new(3.0).unwrap();
        assert_eq!(engine.quote(4.5, 2.0).unwrap(), 27);
        assert_eq!(engine.total_supply(), 0);
        assert_eq!(engine.mint(4.5, 2.0).unwrap(), 27);
    }

    #[test]
    fn rejects_bad_base_rate() {
        assert!(MeritEngine::new(0.0).is_err());
        assert!(MeritEngine::new(-1.0).is_err());
        assert!(MeritEngine::new(f64::INFINITY).is_err());
    }

    #[test]
    fn unrepresentable_mint_is_invalid_amount() {
        let engine = MeritEngine::new(1.0).unwrap();
        match engine.mint(1e20, 1.0) {
            Err(LedgerError::InvalidAmount(msg)) => assert!(msg.contains("100000000000000000000")),
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
        assert_eq!(engine.total_supply(), 0);
    }

    #[test]
    fn supply_overflow_leaves_counter_alone() {
        let engine = MeritEngine::new(1.0).unwrap();
        engine.total_supply.store(u64::MAX - 1, Ordering::Release);
        assert!(matches!(
            engine.mint(5.0, 1.0),
            Err(LedgerError::Overflow { current, delta: 5 }) if current == u64::MAX - 1
        ));
        assert_eq!(engine.total_supply(), u64::MAX - 1);
    }

    #[test]
    fn identical_engines_follow_identical_trajectories() {
        let calls = [(10.0, 1.0), (3.3, 2.5), (100.0, 0.75), (0.2, 1.0)];
        let a = MeritEngine::new(1.25).unwrap();
        let b = MeritEngine::new(1.25).unwrap();
        for (usd, factor) in calls {
            assert_eq!(a.mint(usd, factor).unwrap(), b.mint(usd, factor).unwrap());
            assert_eq!(a.total_supply(), b.total_supply());
        }
    }

    #[test]
    fn concurrent_mints_sum_exactly() {
        let engine = Arc::new(MeritEngine::new(1.0).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    (0..1_000)
                        .map(|_| engine.mint(7.9, 1.0).unwrap())
                        .sum::<u64>()
                })
            })
            .collect();
        let minted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(minted, 8 * 1_000 * 7);
        assert_eq!(engine.total_supply(), minted);
    }
}
