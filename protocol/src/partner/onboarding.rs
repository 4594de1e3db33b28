//! Onboarding tickets.
//!
//! A ticket is what a new partner scans (typically rendered as a QR code)
//! to start integration: a fresh partner id, the display name, when it was
//! issued, and the capabilities the partner must provide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PartnerError;
use crate::config::ONBOARDING_REQUIRED_CAPABILITIES;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingTicket {
    /// UUIDv4 assigned to the partner.
    pub partner_id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub capabilities_required: Vec<String>,
}

impl OnboardingTicket {
    /// Issues a ticket for `name` (surrounding whitespace is trimmed).
    ///
    /// # Errors
    ///
    /// [`PartnerError::EmptyName`] if `name` is blank.
    pub fn issue(name: &str) -> Result<Self, PartnerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PartnerError::EmptyName);
        }
        Ok(Self {
            partner_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            timestamp: Utc::now(),
            capabilities_required: ONBOARDING_REQUIRED_CAPABILITIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_contents() {
        let ticket = OnboardingTicket::issue("  Test Partner ").unwrap();
        assert_eq!(ticket.name, "Test Partner");
        assert!(Uuid::parse_str(&ticket.partner_id).is_ok());
        assert_eq!(
            ticket.capabilities_required,
            vec![
                "real_time_transactions",
                "user_wallet_mapping",
                "usd_conversion"
            ]
        );
    }

    #[test]
    fn blank_name_rejected() {
        assert_eq!(OnboardingTicket::issue(" \t"), Err(PartnerError::EmptyName));
    }

    #[test]
    fn each_ticket_gets_a_new_id() {
        let a = OnboardingTicket::issue("p").unwrap();
        let b = OnboardingTicket::issue("p").unwrap();
        assert_ne!(a.partner_id, b.partner_id);
    }
}
