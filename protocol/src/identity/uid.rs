//! # Wallet Identifiers
//!
//! A wallet id is an opaque string. Callers may bring their own (a user id
//! from a partner system, say) or let [`generate_uid`] derive one: the
//! hex SHA-256 of a caller-supplied seed, or of 32 bytes from the OS RNG
//! when no seed is given.

use rand::RngCore;

use crate::config::MAX_IDENTIFIER_LENGTH;
use crate::crypto::hash::sha256_hex;
use crate::error::LedgerError;

/// Derive a 64-character hex identifier.
///
/// With `Some(seed)` the result is deterministic. An empty seed is treated
/// like `None`.
///
/// ```
/// use omniutil_protocol::identity::generate_uid;
///
/// let a = generate_uid(Some(b"alice"));
/// assert_eq!(a, generate_uid(Some(b"alice")));
/// assert_eq!(a.len(), 64);
/// ```
pub fn generate_uid(seed: Option<&[u8]>) -> String {
    match seed {
        Some(seed) if !seed.is_empty() => sha256_hex(seed),
        _ => {
            let mut random = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut random);
            sha256_hex(&random)
        }
    }
}

/// Check that an identifier is usable as a wallet, partner or user id.
///
/// Rejects empty strings, strings longer than [`MAX_IDENTIFIER_LENGTH`]
/// bytes, and anything containing whitespace or control characters.
pub fn validate_identifier(id: &str) -> Result<(), LedgerError> {
    if id.is_empty()
        || id.len() > MAX_IDENTIFIER_LENGTH
        || id.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(LedgerError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}
