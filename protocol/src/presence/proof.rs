//! # Proof of Presence
//!
//! A presence proof is a signed, timestamped statement that a given signer
//! vouches for a deployed contract under a name and symbol.
//!
//! ## Construction
//!
//! ```text
//! payload   = { contract, name, signer, symbol, timestamp }
//! canonical = compact JSON of payload, keys in lexicographic order
//! hash      = hex(SHA-256(canonical))
//! signature = hex(Ed25519(signer_key, ASCII(hash)))
//! ```
//!
//! The signature covers the hex string rather than the raw digest, so a
//! verifier only ever needs the values that appear in the published proof.
//! Proofs serialize flat: the payload fields sit next to `hash`,
//! `signature` and `signature_type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PRESENCE_SIGNATURE_TYPE;
use crate::crypto::hash::sha256_hex;
use crate::crypto::keys::{verify_hex, KeyError, SignerKeypair};
use crate::ledger::entry::canonical_timestamp;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PresenceError {
    /// A required identity field is blank.
    #[error("presence identity field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// The stored hash does not match the payload.
    #[error("proof hash does not match payload")]
    HashMismatch,

    /// The signature does not verify against the signer key.
    #[error("proof signature does not verify")]
    InvalidSignature,

    /// The proof names a scheme other than Ed25519.
    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(String),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Identity & payload
// ---------------------------------------------------------------------------

/// What the proof is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceIdentity {
    pub contract: String,
    pub name: String,
    pub symbol: String,
}

impl PresenceIdentity {
    /// # Errors
    ///
    /// [`PresenceError::EmptyField`] if any field is blank.
    pub fn new(contract: &str, name: &str, symbol: &str) -> Result<Self, PresenceError> {
        for (field, value) in [("contract", contract), ("name", name), ("symbol", symbol)] {
            if value.trim().is_empty() {
                return Err(PresenceError::EmptyField(field));
            }
        }
        Ok(Self {
            contract: contract.trim().to_string(),
            name: name.trim().to_string(),
            symbol: symbol.trim().to_string(),
        })
    }
}

/// The signed part of a proof.
///
/// Field order is the canonical key order; keep it alphabetical.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresencePayload {
    pub contract: String,
    pub name: String,
    /// Hex Ed25519 verifying key of the signer.
    pub signer: String,
    pub symbol: String,
    pub timestamp: String,
}

impl PresencePayload {
    /// Compact JSON with keys in lexicographic order.
    pub fn canonical_json(&self) -> Result<String, PresenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Hex SHA-256 of [`canonical_json`](Self::canonical_json).
    pub fn digest(&self) -> Result<String, PresenceError> {
        Ok(sha256_hex(self.canonical_json()?.as_bytes()))
    }
}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceProof {
    #[serde(flatten)]
    pub payload: PresencePayload,
    pub hash: String,
    pub signature: String,
    pub signature_type: String,
}

impl PresenceProof {
    /// Recomputes the payload hash and checks the signature over it.
    ///
    /// # Errors
    ///
    /// [`PresenceError::HashMismatch`], [`PresenceError::InvalidSignature`]
    /// or [`PresenceError::UnsupportedSignatureType`] when the proof doesn't
    /// hold up; [`PresenceError::Key`] for undecodable key material.
    pub fn verify(&self) -> Result<(), PresenceError> {
        if self.signature_type != PRESENCE_SIGNATURE_TYPE {
            return Err(PresenceError::UnsupportedSignatureType(
                self.signature_type.clone(),
            ));
        }
        if self.payload.digest()? != self.hash {
            return Err(PresenceError::HashMismatch);
        }
        if !verify_hex(&self.payload.signer, self.hash.as_bytes(), &self.signature)? {
            return Err(PresenceError::InvalidSignature);
        }
        Ok(())
    }
}

/// Builds and signs a proof for `identity` at time `now`.
pub fn build_proof(
    identity: &PresenceIdentity,
    signer: &SignerKeypair,
    now: DateTime<Utc>,
) -> Result<PresenceProof, PresenceError> {
    let payload = PresencePayload {
        contract: identity.contract.clone(),
        name: identity.name.clone(),
        signer: signer.public_key_hex(),
        symbol: identity.symbol.clone(),
        timestamp: canonical_timestamp(&now),
    };
    let hash = payload.digest()?;
    let signature = signer.sign_hex(hash.as_bytes());

    Ok(PresenceProof {
        payload,
        hash,
        signature,
        signature_type: PRESENCE_SIGNATURE_TYPE.to_string(),
    })
}
