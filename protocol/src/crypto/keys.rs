//! # Signer Keys
//!
//! Ed25519 keypairs used to sign presence proofs. The node loads one from
//! `OMNI_SIGNING_KEY` (hex-encoded 32-byte secret) or generates a fresh one
//! with `omniutil-node keygen`.
//!
//! Key bytes are never logged. The `Debug` impl prints only the public half.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Deliberately vague about key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: expected {SECRET_KEY_LENGTH} hex-encoded bytes")]
    InvalidSecretKey,

    #[error("invalid public key: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,
}

/// An Ed25519 keypair that signs on behalf of this deployment.
pub struct SignerKeypair {
    signing_key: SigningKey,
}

impl SignerKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte seed. Deterministic; tests use this.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Load a keypair from a hex-encoded secret key. Surrounding whitespace
    /// and an optional `0x` prefix are tolerated.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex-encoded secret key. Only `keygen` should ever call this.
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Hex-encoded public key. This is the `signer` field of a presence
    /// proof.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `message` and return the 64-byte signature as hex.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for SignerKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerKeypair(pub={})", self.public_key_hex())
    }
}

/// Verify a hex signature against a hex public key.
///
/// Returns `Ok(false)` for a well-formed signature that doesn't verify and
/// an error when either input can't be decoded.
pub fn verify_hex(public_key_hex: &str, message: &[u8], signature_hex: &str) -> Result<bool, KeyError> {
    let key_bytes: [u8; 32] = hex::decode(public_key_hex)
        .map_err(|_| KeyError::InvalidPublicKey)?
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::InvalidPublicKey)?;
    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| KeyError::InvalidPublicKey)?;

    let sig_bytes: [u8; 64] = hex::decode(signature_hex)
        .map_err(|_| KeyError::InvalidSignature)?
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::InvalidSignature)?;
    let signature = Signature::from_bytes(&sig_bytes);

    Ok(verifying_key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let kp = SignerKeypair::from_seed(&[7u8; 32]);
        let sig = kp.sign_hex(b"presence");
        assert!(verify_hex(&kp.public_key_hex(), b"presence", &sig).unwrap());
    }

    #[test]
    fn tampered_message_fails() {
        let kp = SignerKeypair::from_seed(&[7u8; 32]);
        let sig = kp.sign_hex(b"presence");
        assert!(!verify_hex(&kp.public_key_hex(), b"absence", &sig).unwrap());
    }

    #[test]
    fn from_hex_roundtrip() {
        let kp = SignerKeypair::generate();
        let restored = SignerKeypair::from_hex(&kp.secret_key_hex()).unwrap();
        assert_eq!(kp.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn from_hex_accepts_prefix_and_whitespace() {
        let kp = SignerKeypair::from_seed(&[1u8; 32]);
        let input = format!("  0x{}\n", kp.secret_key_hex());
        let restored = SignerKeypair::from_hex(&input).unwrap();
        assert_eq!(kp.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            SignerKeypair::from_hex("abcd"),
            Err(KeyError::InvalidSecretKey)
        ));
        assert!(matches!(
            SignerKeypair::from_hex("not hex"),
            Err(KeyError::InvalidSecretKey)
        ));
    }

    #[test]
    fn verify_rejects_garbage_signature() {
        let kp = SignerKeypair::from_seed(&[2u8; 32]);
        assert!(matches!(
            verify_hex(&kp.public_key_hex(), b"m", "zz"),
            Err(KeyError::InvalidSignature)
        ));
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = SignerKeypair::from_seed(&[9u8; 32]);
        let debug = format!("{:?}", kp);
        assert!(!debug.contains(&kp.secret_key_hex()));
        assert!(debug.contains(&kp.public_key_hex()));
    }
}
