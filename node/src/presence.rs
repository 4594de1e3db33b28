//! # Presence Worker
//!
//! Runs the proof-of-presence cycle. Each cycle:
//!
//! 1. loads the task state from `<data_dir>/presence_state.json` and the
//!    proof log from `<public_dir>/proof_of_presence.json`,
//! 2. appends a freshly signed proof when the newest one (per state or log)
//!    is older than [`PRESENCE_PROOF_TTL`], then saves the state,
//! 3. scores the public footprint and writes `<public_dir>/presence_score.json`,
//! 4. logs the state digest.
//!
//! The log's newest proof always counts as a run, so a cycle that appended
//! a proof but failed to save the state does not sign a second one.
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! crash never leaves a half-written JSON document behind. Cycles do
//! blocking file I/O; [`run_loop`] runs each one on the blocking pool.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use omniutil_protocol::config::PRESENCE_PROOF_TTL;
use omniutil_protocol::crypto::keys::SignerKeypair;
use omniutil_protocol::presence::{
    build_proof, PresenceChecklist, PresenceIdentity, PresenceProof, PresenceReport,
    PresenceState,
};

use crate::cli::PresenceArgs;

const STATE_FILE: &str = "presence_state.json";
const PROOF_LOG_FILE: &str = "proof_of_presence.json";
const SCORE_FILE: &str = "presence_score.json";
const SITEMAP_FILE: &str = "sitemap.xml";
const META_DIR: &str = "meta";
const PROOF_TASK: &str = "proof";

/// Everything a cycle needs, resolved from the CLI.
pub struct PresenceConfig {
    pub data_dir: PathBuf,
    pub public_dir: PathBuf,
    pub identity: PresenceIdentity,
    pub signer: SignerKeypair,
    pub explorer_key: bool,
    pub rpc_url: bool,
    pub core_contract: bool,
}

impl PresenceConfig {
    pub fn from_args(args: &PresenceArgs) -> Result<Self> {
        let signer = SignerKeypair::from_hex(args.signing_key.trim())
            .context("invalid presence signing key")?;
        let identity = PresenceIdentity::new(&args.contract, &args.name, &args.symbol)
            .context("invalid presence identity")?;

        Ok(Self {
            data_dir: args.data_dir.clone(),
            public_dir: args.public_dir.clone(),
            identity,
            signer,
            explorer_key: is_set(&args.explorer_key),
            rpc_url: is_set(&args.rpc_url),
            core_contract: is_set(&args.core_contract),
        })
    }

    fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    fn proof_log_path(&self) -> PathBuf {
        self.public_dir.join(PROOF_LOG_FILE)
    }

    fn score_path(&self) -> PathBuf {
        self.public_dir.join(SCORE_FILE)
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// `true` if a new proof was appended to the log.
    pub proof_written: bool,
    pub score: u32,
    /// Digest of the saved task state.
    pub state_digest: String,
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// Runs one presence cycle at time `now`.
pub fn run_cycle(config: &PresenceConfig, now: DateTime<Utc>) -> Result<CycleOutcome> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    fs::create_dir_all(&config.public_dir)
        .with_context(|| format!("failed to create {}", config.public_dir.display()))?;

    let mut state: PresenceState = read_json(&config.state_path())?.unwrap_or_default();
    let mut log: Vec<PresenceProof> = read_json(&config.proof_log_path())?.unwrap_or_default();

    if let Some(logged) = log.last().and_then(proof_time) {
        if state.last_run(PROOF_TASK).map_or(true, |last| logged > last) {
            tracing::debug!(%logged, "state behind proof log, catching up");
            state.mark(PROOF_TASK, logged);
        }
    }

    let proof_written = if state.is_fresh(PROOF_TASK, PRESENCE_PROOF_TTL, now) {
        tracing::debug!(last_run = ?state.last_run(PROOF_TASK), "presence proof still fresh");
        false
    } else {
        log.push(build_proof(&config.identity, &config.signer, now)?);
        write_json(&config.proof_log_path(), &log)?;
        tracing::info!(entries = log.len(), "presence proof appended");
        state.mark(PROOF_TASK, now);
        true
    };
    write_json(&config.state_path(), &state)?;

    let checklist = PresenceChecklist {
        proof_log: config.proof_log_path().is_file(),
        sitemap: config.public_dir.join(SITEMAP_FILE).is_file(),
        meta_dir: config.public_dir.join(META_DIR).is_dir(),
        explorer_key: config.explorer_key,
        rpc_url: config.rpc_url,
        core_contract: config.core_contract,
    };
    let report = PresenceReport {
        timestamp: now,
        score: checklist.score(),
        contract: config.identity.contract.clone(),
    };
    write_json(&config.score_path(), &report)?;

    let state_digest = state.digest()?;

    tracing::info!(
        proof_written,
        score = report.score,
        state_digest = %state_digest,
        "presence cycle complete"
    );

    Ok(CycleOutcome {
        proof_written,
        score: report.score,
        state_digest,
    })
}

/// Runs cycles every `interval` until the future is dropped. A failed cycle
/// is logged and the next one still runs.
pub async fn run_loop(config: PresenceConfig, interval: Duration) {
    let config = Arc::new(config);
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let cycle_config = Arc::clone(&config);
        let cycle = tokio::task::spawn_blocking(move || run_cycle(&cycle_config, Utc::now()));
        match cycle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!(error = ?e, "presence cycle failed"),
            Err(e) => tracing::error!(error = %e, "presence cycle task aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// File Helpers
// ---------------------------------------------------------------------------

/// When a logged proof was signed; `None` if its timestamp is unreadable.
fn proof_time(proof: &PresenceProof) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&proof.payload.timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Reads a JSON document; `None` if the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    let value = serde_json::from_slice(&raw)
        .with_context(|| format!("malformed JSON in {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, body).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
