//! Registered partners.
//!
//! An owned, concurrent map from partner id to [`PartnerRecord`]. The node
//! keeps one behind an `Arc`; tests make as many as they like.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::error::PartnerError;
use super::scoring::{CapabilityChecklist, PartnerAssessment, PartnerTier};
use crate::identity::validate_identifier;

/// What a partner tells us about itself at registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub name: String,
    #[serde(default)]
    pub capabilities: CapabilityChecklist,
    /// Free-form extra fields (website, contact, region...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A registered partner and the assessment it was admitted with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub partner_id: String,
    pub profile: PartnerProfile,
    pub tier: PartnerTier,
    pub score: u32,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PartnerRegistry {
    partners: DashMap<String, PartnerRecord>,
}

impl PartnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a partner under `partner_id` with the tier and score from
    /// `assessment`.
    ///
    /// # Errors
    ///
    /// - [`PartnerError::InvalidPartnerId`] for a malformed id.
    /// - [`PartnerError::EmptyName`] if the profile name is blank.
    /// - [`PartnerError::DuplicatePartner`] if the id is taken.
    pub fn register(
        &self,
        partner_id: &str,
        profile: PartnerProfile,
        assessment: &PartnerAssessment,
    ) -> Result<PartnerRecord, PartnerError> {
        validate_identifier(partner_id)
            .map_err(|_| PartnerError::InvalidPartnerId(partner_id.to_string()))?;
        if profile.name.trim().is_empty() {
            return Err(PartnerError::EmptyName);
        }

        match self.partners.entry(partner_id.to_string()) {
            Entry::Occupied(_) => Err(PartnerError::DuplicatePartner(partner_id.to_string())),
            Entry::Vacant(vacant) => {
                let record = PartnerRecord {
                    partner_id: partner_id.to_string(),
                    profile,
                    tier: assessment.tier,
                    score: assessment.score,
                    registered_at: Utc::now(),
                };
                tracing::info!(
                    partner = partner_id,
                    tier = %record.tier,
                    score = record.score,
                    "partner registered"
                );
                vacant.insert(record.clone());
                Ok(record)
            }
        }
    }

    pub fn get(&self, partner_id: &str) -> Option<PartnerRecord> {
        self.partners.get(partner_id).map(|r| r.value().clone())
    }

    /// Every partner, sorted by id.
    pub fn list(&self) -> Vec<PartnerRecord> {
        let mut all: Vec<PartnerRecord> = self.partners.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.partner_id.cmp(&b.partner_id));
        all
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::scoring::{inspect_partner, TierPolicy};

    fn profile(name: &str) -> PartnerProfile {
        PartnerProfile {
            name: name.to_string(),
            capabilities: CapabilityChecklist {
                api: true,
                realtime: true,
                kyc_optional: true,
                stablecoin_ready: false,
            },
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn register_and_lookup() {
        let registry = PartnerRegistry::new();
        let p = profile("Corner Cafe");
        let assessment = inspect_partner(&p.capabilities, &TierPolicy::default());

        let record = registry.register("cafe", p, &assessment).unwrap();
        assert_eq!(record.tier, PartnerTier::Full);
        assert_eq!(record.score, 90);
        assert_eq!(registry.get("cafe").unwrap(), record);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicates_rejected() {
        let registry = PartnerRegistry::new();
        let p = profile("Corner Cafe");
        let assessment = inspect_partner(&p.capabilities, &TierPolicy::default());
        registry.register("cafe", p.clone(), &assessment).unwrap();

        assert_eq!(
            registry.register("cafe", p, &assessment).unwrap_err(),
            PartnerError::DuplicatePartner("cafe".into())
        );
    }

    #[test]
    fn validation() {
        let registry = PartnerRegistry::new();
        let assessment = inspect_partner(&CapabilityChecklist::default(), &TierPolicy::default());
        assert!(matches!(
            registry.register("", profile("x"), &assessment),
            Err(PartnerError::InvalidPartnerId(_))
        ));
        assert_eq!(
            registry.register("p", profile("  "), &assessment),
            Err(PartnerError::EmptyName)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn list_is_sorted() {
        let registry = PartnerRegistry::new();
        let assessment = inspect_partner(&CapabilityChecklist::default(), &TierPolicy::default());
        for id in ["zeta", "alpha", "mid"] {
            registry.register(id, profile(id), &assessment).unwrap();
        }
        let ids: Vec<String> = registry.list().into_iter().map(|r| r.partner_id).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn independent_registries_do_not_share_state() {
        let a = PartnerRegistry::new();
        let b = PartnerRegistry::new();
        let assessment = inspect_partner(&CapabilityChecklist::default(), &TierPolicy::default());
        a.register("p", profile("p"), &assessment).unwrap();
        assert!(b.get("p").is_none());
    }
}
