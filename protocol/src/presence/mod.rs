//! # Presence Module
//!
//! Signed proof-of-presence statements for a deployment, the task state
//! that paces how often they are produced, and the presence score. The
//! periodic loop and all file I/O live in the node.

pub mod proof;
pub mod score;
pub mod state;

pub use proof::{build_proof, PresenceError, PresenceIdentity, PresencePayload, PresenceProof};
pub use score::{PresenceChecklist, PresenceReport};
pub use state::PresenceState;
