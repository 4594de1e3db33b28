//! # Partner Scoring
//!
//! A prospective partner describes its integration as a
//! [`CapabilityChecklist`]. Each capability carries a fixed weight:
//!
//! | Capability         | Weight |
//! |--------------------|--------|
//! | `api`              | 40     |
//! | `realtime`         | 30     |
//! | `kyc_optional`     | 20     |
//! | `stablecoin_ready` | 10     |
//!
//! The summed score is classified by a [`TierPolicy`], an ordered table of
//! `(min_score, tier)` bands. The default table is:
//!
//! ```text
//!  0 ..  59  Rejected
//! 60 ..  79  Limited
//! 80 .. 100  Full
//! ```
//!
//! A partner is approved for any tier other than `Rejected`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::PartnerError;
use crate::config::{
    PARTNER_FULL_THRESHOLD, PARTNER_LIMITED_THRESHOLD, PARTNER_WEIGHT_API,
    PARTNER_WEIGHT_KYC_OPTIONAL, PARTNER_WEIGHT_REALTIME, PARTNER_WEIGHT_STABLECOIN_READY,
};

// ---------------------------------------------------------------------------
// CapabilityChecklist
// ---------------------------------------------------------------------------

/// Self-reported integration capabilities. Missing fields read as `false`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityChecklist {
    pub api: bool,
    pub realtime: bool,
    pub kyc_optional: bool,
    pub stablecoin_ready: bool,
}

impl CapabilityChecklist {
    /// Weighted sum of the capabilities present, 0 through 100.
    pub fn score(&self) -> u32 {
        [
            (self.api, PARTNER_WEIGHT_API),
            (self.realtime, PARTNER_WEIGHT_REALTIME),
            (self.kyc_optional, PARTNER_WEIGHT_KYC_OPTIONAL),
            (self.stablecoin_ready, PARTNER_WEIGHT_STABLECOIN_READY),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| weight)
        .sum()
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Operating mode granted to a partner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerTier {
    Rejected,
    Limited,
    Full,
}

impl fmt::Display for PartnerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rejected => "REJECTED",
            Self::Limited => "LIMITED",
            Self::Full => "FULL",
        };
        f.write_str(s)
    }
}

/// One row of a [`TierPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    /// Lowest score (inclusive) that lands in this band.
    pub min_score: u32,
    pub tier: PartnerTier,
}

/// Score-to-tier table.
///
/// Bands are sorted by strictly increasing `min_score` and the first band
/// starts at 0, so every score maps to exactly one tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierBand>", into = "Vec<TierBand>")]
pub struct TierPolicy {
    bands: Vec<TierBand>,
}

impl TierPolicy {
    /// # Errors
    ///
    /// [`PartnerError::InvalidPolicy`] if `bands` is empty, the first band
    /// doesn't start at 0, or minimums aren't strictly increasing.
    pub fn new(bands: Vec<TierBand>) -> Result<Self, PartnerError> {
        let first = bands
            .first()
            .ok_or_else(|| PartnerError::InvalidPolicy("no bands".to_string()))?;
        if first.min_score != 0 {
            return Err(PartnerError::InvalidPolicy(format!(
                "first band must start at 0, starts at {}",
                first.min_score
            )));
        }
        if let Some(pair) = bands.windows(2).find(|w| w[1].min_score <= w[0].min_score) {
            return Err(PartnerError::InvalidPolicy(format!(
                "band minimums must strictly increase ({} then {})",
                pair[0].min_score, pair[1].min_score
            )));
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }

    /// The tier of the highest band whose minimum is at or below `score`.
    pub fn classify(&self, score: u32) -> PartnerTier {
        self.bands
            .iter()
            .rev()
            .find(|band| band.min_score <= score)
            .map_or(PartnerTier::Rejected, |band| band.tier)
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            bands: vec![
                TierBand {
                    min_score: 0,
                    tier: PartnerTier::Rejected,
                },
                TierBand {
                    min_score: PARTNER_LIMITED_THRESHOLD,
                    tier: PartnerTier::Limited,
                },
                TierBand {
                    min_score: PARTNER_FULL_THRESHOLD,
                    tier: PartnerTier::Full,
                },
            ],
        }
    }
}

impl TryFrom<Vec<TierBand>> for TierPolicy {
    type Error = PartnerError;

    fn try_from(bands: Vec<TierBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<TierPolicy> for Vec<TierBand> {
    fn from(policy: TierPolicy) -> Self {
        policy.bands
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// Outcome of [`inspect_partner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerAssessment {
    pub score: u32,
    pub tier: PartnerTier,
    pub approved: bool,
}

/// Scores a checklist and classifies it under `policy`.
pub fn inspect_partner(checklist: &CapabilityChecklist, policy: &TierPolicy) -> PartnerAssessment {
    let score = checklist.score();
    let tier = policy.classify(score);
    PartnerAssessment {
        score,
        tier,
        approved: tier != PartnerTier::Rejected,
    }
}
