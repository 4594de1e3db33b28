//! Errors raised by partner scoring, registration and onboarding.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartnerError {
    /// A tier policy table is empty, misordered or doesn't start at 0.
    #[error("invalid tier policy: {0}")]
    InvalidPolicy(String),

    /// A partner with this id is already registered.
    #[error("partner already registered: {0}")]
    DuplicatePartner(String),

    /// The partner id is empty or malformed.
    #[error("invalid partner id: {0:?}")]
    InvalidPartnerId(String),

    /// The partner display name is blank.
    #[error("partner name must not be empty")]
    EmptyName,
}
