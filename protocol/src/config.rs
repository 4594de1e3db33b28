//! # Protocol Configuration & Constants
//!
//! Every magic number in the accounting core lives here. Scoring weights,
//! tier thresholds, reserved identifiers, TTLs and default ports: if a value
//! changes what the ledger or the partner pipeline computes, it belongs in
//! this file and nowhere else.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Full protocol version string reported by the node.
pub const PROTOCOL_VERSION: &str = "0.1.0";

/// BLAKE3 derive-key context for ledger chain links.
pub const LEDGER_CHAIN_CONTEXT: &str = "omniutil ledger chain v1";

// ---------------------------------------------------------------------------
// Assets & Issuance
// ---------------------------------------------------------------------------

/// The accounting unit minted by the merit engine. Every wallet starts
/// with a zero balance of it.
pub const DEFAULT_ASSET: &str = "MERIT";

/// Longest accepted asset symbol.
pub const MAX_ASSET_SYMBOL_LENGTH: usize = 16;

/// Reserved sender identifier for ledger entries that record issuance
/// rather than a wallet-to-wallet transfer.
pub const MINT_ISSUER_ID: &str = "mint";

/// Default merit per USD when the operator doesn't configure one.
pub const DEFAULT_BASE_RATE: f64 = 1.0;

/// Partner factor applied when the caller doesn't pass one.
pub const DEFAULT_PARTNER_FACTOR: f64 = 1.0;

/// Longest accepted wallet / partner / user identifier, in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// Partner Scoring
// ---------------------------------------------------------------------------

/// Weight of a public API in the partner capability score.
pub const PARTNER_WEIGHT_API: u32 = 40;

/// Weight of real-time transaction support.
pub const PARTNER_WEIGHT_REALTIME: u32 = 30;

/// Weight of optional-KYC onboarding.
pub const PARTNER_WEIGHT_KYC_OPTIONAL: u32 = 20;

/// Weight of stablecoin readiness.
pub const PARTNER_WEIGHT_STABLECOIN_READY: u32 = 10;

/// Lowest score that earns the `Limited` tier (and therefore approval).
pub const PARTNER_LIMITED_THRESHOLD: u32 = 60;

/// Lowest score that earns the `Full` tier.
pub const PARTNER_FULL_THRESHOLD: u32 = 80;

/// Capabilities every onboarding ticket asks the partner to provide.
pub const ONBOARDING_REQUIRED_CAPABILITIES: [&str; 3] = [
    "real_time_transactions",
    "user_wallet_mapping",
    "usd_conversion",
];

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Presence score ceiling.
pub const PRESENCE_MAX_SCORE: u32 = 100;

/// Weight of a published proof log.
pub const PRESENCE_WEIGHT_PROOF: u32 = 25;

/// Weight of a published sitemap.
pub const PRESENCE_WEIGHT_SITEMAP: u32 = 15;

/// Weight of a published metadata directory.
pub const PRESENCE_WEIGHT_META: u32 = 15;

/// Weight of a configured block explorer API key.
pub const PRESENCE_WEIGHT_EXPLORER_KEY: u32 = 10;

/// Weight of a configured chain RPC endpoint.
pub const PRESENCE_WEIGHT_RPC_URL: u32 = 10;

/// Weight of a configured core contract address.
pub const PRESENCE_WEIGHT_CORE_CONTRACT: u32 = 10;

/// How long a signed presence proof stays fresh before the next cycle
/// signs a new one.
pub const PRESENCE_PROOF_TTL: Duration = Duration::from_secs(24 * 3600);

/// Default pause between presence cycles, in minutes.
pub const DEFAULT_PRESENCE_INTERVAL_MINUTES: u64 = 30;

/// Signature scheme label stamped on presence proofs.
pub const PRESENCE_SIGNATURE_TYPE: &str = "Ed25519";

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Default HTTP API port.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 9100;
