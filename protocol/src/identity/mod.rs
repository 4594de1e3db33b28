//! # Identity Module
//!
//! Wallet and partner identifiers are opaque strings. This module generates
//! them (hex SHA-256 of a seed, or of 32 random bytes) and decides which
//! caller-supplied strings are acceptable.

pub mod uid;

pub use uid::{generate_uid, validate_identifier};
