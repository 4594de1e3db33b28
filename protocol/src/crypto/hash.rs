//! # Hashing Utilities
//!
//! Two hash functions, each with a clear job:
//!
//! - **SHA-256** — anything an outside auditor has to reproduce: ledger
//!   entry hashes, presence payload digests, state digests. Every language
//!   ships SHA-256, so reimplementations can check our bytes.
//!
//! - **BLAKE3** — internal structures only. The ledger journal chains
//!   records together with BLAKE3 in derive-key mode so chain links can
//!   never collide with an entry hash.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use omniutil_protocol::crypto::sha256;
///
/// let hash = sha256(b"omniutil");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 rendered as lowercase hex. This is the form stored on ledger
/// entries and presence proofs.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// SHA-256 over a sequence of length-prefixed fields.
///
/// Each field is fed as a 4-byte big-endian length followed by its bytes,
/// so `("ab", "c")` and `("a", "bc")` hash differently. Callers pick the
/// field order; this function only fixes the framing.
pub fn sha256_fields(fields: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u32).to_be_bytes());
        hasher.update(field);
    }
    hasher.finalize().into()
}

/// Domain-separated BLAKE3 over several parts.
///
/// Uses BLAKE3's `derive_key` mode with `context` as the domain tag, so
/// the same bytes hashed under two contexts never collide.
pub fn domain_separated_hash(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc") from FIPS 180-2.
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_fields_framing_prevents_ambiguity() {
        let a = sha256_fields(&[b"ab", b"c"]);
        let b = sha256_fields(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn sha256_fields_is_deterministic() {
        let a = sha256_fields(&[b"alice", b"bob", b"30"]);
        let b = sha256_fields(&[b"alice", b"bob", b"30"]);
        assert_eq!(a, b);
    }

    #[test]
    fn domain_separation_changes_output() {
        let a = domain_separated_hash("context-a", &[b"payload"]);
        let b = domain_separated_hash("context-b", &[b"payload"]);
        assert_ne!(a, b);
    }
}
