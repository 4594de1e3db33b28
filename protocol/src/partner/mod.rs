//! # Partner Module
//!
//! Admission of merchants and platforms that report purchases to the
//! engine.
//!
//! ```text
//! scoring.rs     — Capability checklist, tier policy table, assessment
//! registry.rs    — Owned, concurrent partner registry
//! onboarding.rs  — Onboarding tickets for new partners
//! error.rs       — PartnerError
//! ```

pub mod error;
pub mod onboarding;
pub mod registry;
pub mod scoring;

pub use error::PartnerError;
pub use onboarding::OnboardingTicket;
pub use registry::{PartnerProfile, PartnerRecord, PartnerRegistry};
pub use scoring::{
    inspect_partner, CapabilityChecklist, PartnerAssessment, PartnerTier, TierBand, TierPolicy,
};
