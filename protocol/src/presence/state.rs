//! Presence task state.
//!
//! Remembers when each periodic task (`proof`, for instance) last ran so a
//! cycle can skip work that is still fresh. Persisted by the node as JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::proof::PresenceError;
use crate::crypto::hash::sha256_hex;

/// Task name → last completion time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceState {
    tasks: BTreeMap<String, DateTime<Utc>>,
}

impl PresenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `task` ran less than `ttl` before `now`.
    pub fn is_fresh(&self, task: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        let Some(last) = self.tasks.get(task) else {
            return false;
        };
        match (now - *last).to_std() {
            Ok(elapsed) => elapsed < ttl,
            // Last run is in the future (clock moved back): treat as fresh.
            Err(_) => true,
        }
    }

    pub fn mark(&mut self, task: &str, now: DateTime<Utc>) {
        self.tasks.insert(task.to_string(), now);
    }

    pub fn last_run(&self, task: &str) -> Option<DateTime<Utc>> {
        self.tasks.get(task).copied()
    }

    /// Hex SHA-256 of the state's JSON (keys sorted).
    pub fn digest(&self) -> Result<String, PresenceError> {
        Ok(sha256_hex(serde_json::to_string(self)?.as_bytes()))
    }
}
