//! # CLI Interface
//!
//! Command-line arguments for `omniutil-node`, via `clap` derive. Every
//! option can also come from an `OMNI_*` environment variable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use omniutil_protocol::config::{
    DEFAULT_API_PORT, DEFAULT_BASE_RATE, DEFAULT_METRICS_PORT, DEFAULT_PRESENCE_INTERVAL_MINUTES,
};

use crate::logging::LogFormat;

/// OmniUtil accounting node.
///
/// Serves the wallet / ledger / merit HTTP API with Prometheus metrics, and
/// runs the periodic proof-of-presence worker.
#[derive(Parser, Debug)]
#[command(
    name = "omniutil-node",
    about = "OmniUtil accounting node",
    version,
    propagate_version = true
)]
pub struct OmniNodeCli {
    /// Log output format.
    #[arg(long, global = true, value_enum, env = "OMNI_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API and the metrics endpoint.
    Serve(ServeArgs),
    /// Run the proof-of-presence worker.
    Presence(PresenceArgs),
    /// Generate an Ed25519 signing key for presence proofs.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind both listeners on.
    #[arg(long, env = "OMNI_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port for the HTTP API.
    #[arg(long, env = "OMNI_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "OMNI_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// MERIT minted per USD before the partner factor.
    #[arg(long, env = "OMNI_BASE_RATE", default_value_t = DEFAULT_BASE_RATE)]
    pub base_rate: f64,
}

#[derive(Parser, Debug)]
pub struct PresenceArgs {
    /// Directory for worker state.
    #[arg(long, short = 'd', env = "OMNI_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory the proof log and score are published to.
    #[arg(long, env = "OMNI_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Hex-encoded Ed25519 secret key (see `keygen`).
    #[arg(long, env = "OMNI_SIGNING_KEY", hide_env_values = true)]
    pub signing_key: String,

    /// Deployed contract address the proofs vouch for.
    #[arg(long, env = "OMNI_CONTRACT_ADDRESS")]
    pub contract: String,

    #[arg(long, env = "OMNI_NAME")]
    pub name: String,

    #[arg(long, env = "OMNI_SYMBOL")]
    pub symbol: String,

    /// Minutes between cycles.
    #[arg(long, env = "OMNI_INTERVAL_MINUTES", default_value_t = DEFAULT_PRESENCE_INTERVAL_MINUTES)]
    pub interval_minutes: u64,

    /// Run a single cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Block explorer API key; only its presence is scored.
    #[arg(long, env = "BSCSCAN_API_KEY", hide_env_values = true)]
    pub explorer_key: Option<String>,

    #[arg(long, env = "BSC_RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "OMNIUTIL_CORE_V2_ADDRESS")]
    pub core_contract: Option<String>,
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Write the secret key here (mode 0600) instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        OmniNodeCli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = OmniNodeCli::try_parse_from(["omniutil-node", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.api_port, DEFAULT_API_PORT);
        assert_eq!(args.base_rate, DEFAULT_BASE_RATE);
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn presence_once_with_json_logs() {
        let cli = OmniNodeCli::try_parse_from([
            "omniutil-node",
            "--log-format",
            "json",
            "presence",
            "--signing-key",
            "00",
            "--contract",
            "0xabc",
            "--name",
            "OmniUtil",
            "--symbol",
            "OMNI",
            "--once",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Presence(args) = cli.command else {
            panic!("expected presence");
        };
        assert!(args.once);
        assert_eq!(args.interval_minutes, DEFAULT_PRESENCE_INTERVAL_MINUTES);
    }
}
