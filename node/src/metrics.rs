//! # Prometheus Metrics
//!
//! Operational metrics for the accounting API, registered in a dedicated
//! [`prometheus::Registry`] under the `omniutil` namespace and scraped from
//! `/metrics` on the metrics port.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Metric handles shared by the API handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Transfers committed to the ledger.
    pub transfers_total: IntCounter,
    /// Transfers rejected (insufficient balance, unknown wallet, ...).
    pub transfer_failures_total: IntCounter,
    /// MERIT units minted through issuance and partner transactions.
    pub merit_minted_total: IntCounter,
    /// Engine total supply at the last mint.
    pub total_supply: IntGauge,
    /// Open wallets.
    pub wallets: IntGauge,
    /// Ledger journal length.
    pub ledger_entries: IntGauge,
    /// Registered partners.
    pub partners: IntGauge,
    /// Latency of transfer, mint and transaction handlers.
    pub operation_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("omniutil".into()), None)
            .expect("failed to create prometheus registry");

        let transfers_total =
            IntCounter::new("transfers_total", "Transfers committed to the ledger")
                .expect("metric creation");
        registry
            .register(Box::new(transfers_total.clone()))
            .expect("metric registration");

        let transfer_failures_total =
            IntCounter::new("transfer_failures_total", "Transfers rejected by the core")
                .expect("metric creation");
        registry
            .register(Box::new(transfer_failures_total.clone()))
            .expect("metric registration");

        let merit_minted_total =
            IntCounter::new("merit_minted_total", "MERIT units minted by this node")
                .expect("metric creation");
        registry
            .register(Box::new(merit_minted_total.clone()))
            .expect("metric registration");

        let total_supply = IntGauge::new("total_supply", "Merit engine total supply")
            .expect("metric creation");
        registry
            .register(Box::new(total_supply.clone()))
            .expect("metric registration");

        let wallets = IntGauge::new("wallets", "Number of open wallets").expect("metric creation");
        registry
            .register(Box::new(wallets.clone()))
            .expect("metric registration");

        let ledger_entries = IntGauge::new("ledger_entries", "Number of ledger journal records")
            .expect("metric creation");
        registry
            .register(Box::new(ledger_entries.clone()))
            .expect("metric registration");

        let partners =
            IntGauge::new("partners", "Number of registered partners").expect("metric creation");
        registry
            .register(Box::new(partners.clone()))
            .expect("metric registration");

        let operation_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "operation_latency_seconds",
                "Latency of transfer, mint and partner transaction handlers in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(operation_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            transfers_total,
            transfer_failures_total,
            merit_minted_total,
            total_supply,
            wallets,
            ledger_entries,
            partners,
            operation_latency_seconds,
        }
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Sets an `IntGauge` from an unsigned count, saturating at `i64::MAX`.
pub fn set_gauge(gauge: &IntGauge, value: u64) {
    gauge.set(i64::try_from(value).unwrap_or(i64::MAX));
}

pub type SharedMetrics = Arc<NodeMetrics>;

/// `GET /metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
