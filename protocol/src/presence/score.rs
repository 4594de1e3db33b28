//! Presence score.
//!
//! A rough 0–100 measure of how discoverable a deployment is. The node
//! fills a [`PresenceChecklist`] from the filesystem and environment; this
//! module only does the arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{
    PRESENCE_MAX_SCORE, PRESENCE_WEIGHT_CORE_CONTRACT, PRESENCE_WEIGHT_EXPLORER_KEY,
    PRESENCE_WEIGHT_META, PRESENCE_WEIGHT_PROOF, PRESENCE_WEIGHT_RPC_URL,
    PRESENCE_WEIGHT_SITEMAP,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceChecklist {
    /// A proof log has been published.
    pub proof_log: bool,
    pub sitemap: bool,
    /// A `meta/` directory exists alongside the proof log.
    pub meta_dir: bool,
    /// A block explorer API key is configured.
    pub explorer_key: bool,
    pub rpc_url: bool,
    /// The core contract address is configured.
    pub core_contract: bool,
}

impl PresenceChecklist {
    pub fn score(&self) -> u32 {
        let total: u32 = [
            (self.proof_log, PRESENCE_WEIGHT_PROOF),
            (self.sitemap, PRESENCE_WEIGHT_SITEMAP),
            (self.meta_dir, PRESENCE_WEIGHT_META),
            (self.explorer_key, PRESENCE_WEIGHT_EXPLORER_KEY),
            (self.rpc_url, PRESENCE_WEIGHT_RPC_URL),
            (self.core_contract, PRESENCE_WEIGHT_CORE_CONTRACT),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| weight)
        .sum();
        total.min(PRESENCE_MAX_SCORE)
    }
}

/// Contents of `presence_score.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceReport {
    pub timestamp: DateTime<Utc>,
    pub score: u32,
    pub contract: String,
}
