//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited crates:
//!
//! - **SHA-256** (`sha2`) for every digest an auditor must reproduce.
//! - **BLAKE3** for internal chain links.
//! - **Ed25519** (`ed25519-dalek`) for presence proof signatures.

pub mod hash;
pub mod keys;

pub use hash::{domain_separated_hash, sha256, sha256_fields, sha256_hex};
pub use keys::{verify_hex, KeyError, SignerKeypair};
