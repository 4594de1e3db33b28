//! # Merit Module
//!
//! Issuance of the `MERIT` accounting unit from USD valuations.

pub mod engine;

pub use engine::MeritEngine;
