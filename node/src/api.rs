//! # REST API
//!
//! The axum router exposing the accounting core over JSON. Handlers share
//! one [`AppState`] through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Description                          |
//! |--------|------------------------|--------------------------------------|
//! | GET    | `/`                    | Banner                               |
//! | GET    | `/health`              | Liveness check                       |
//! | GET    | `/status`              | Counts, supply, ledger head          |
//! | POST   | `/wallets`             | Open a wallet                        |
//! | GET    | `/wallets/:id`         | Wallet snapshot                      |
//! | POST   | `/transfers`           | Transfer between wallets             |
//! | POST   | `/mint`                | Issue merit to a wallet              |
//! | POST   | `/transactions`        | Process a partner transaction        |
//! | GET    | `/ledger`              | Journal records (`?wallet=` filter)  |
//! | GET    | `/ledger/verify`       | Re-check hashes and chain links      |
//! | POST   | `/partners/inspect`    | Score a capability checklist         |
//! | POST   | `/partners`            | Inspect and register a partner       |
//! | GET    | `/partners`            | List partners                        |
//! | POST   | `/partners/onboarding` | Issue an onboarding ticket           |
//!
//! ## Errors
//!
//! Core errors map to status codes in [`ApiError`] and are returned as
//! `{ "error": "<message>" }`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use omniutil_protocol::accounting::{Accounting, Issuance};
use omniutil_protocol::config::DEFAULT_PARTNER_FACTOR;
use omniutil_protocol::ledger::LedgerRecord;
use omniutil_protocol::partner::{
    inspect_partner, CapabilityChecklist, OnboardingTicket, PartnerAssessment, PartnerError,
    PartnerProfile, PartnerRecord, PartnerRegistry, TierPolicy,
};
use omniutil_protocol::sdk::{process_transaction, TransactionRecord};
use omniutil_protocol::vault::{AssetSymbol, Wallet};
use omniutil_protocol::LedgerError;

use crate::metrics::{set_gauge, SharedMetrics};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared state for every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Reported version string.
    pub version: String,
    pub accounting: Arc<Accounting>,
    pub partners: Arc<PartnerRegistry>,
    /// Tier table used by `/partners` and `/partners/inspect`.
    pub policy: Arc<TierPolicy>,
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full [`Router`] with CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/wallets", post(open_wallet_handler))
        .route("/wallets/:id", get(wallet_handler))
        .route("/transfers", post(transfer_handler))
        .route("/mint", post(mint_handler))
        .route("/transactions", post(transaction_handler))
        .route("/ledger", get(ledger_handler))
        .route("/ledger/verify", get(verify_ledger_handler))
        .route("/partners/inspect", post(inspect_partner_handler))
        .route("/partners", post(register_partner_handler).get(list_partners_handler))
        .route("/partners/onboarding", post(onboarding_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Handler error; renders as a status code plus `{ "error": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Partner(#[from] PartnerError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(e) => match e {
                LedgerError::InvalidAmount(_)
                | LedgerError::InvalidAsset(_)
                | LedgerError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                LedgerError::WalletNotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::DuplicateWallet(_) => StatusCode::CONFLICT,
                LedgerError::InsufficientBalance { .. } | LedgerError::Overflow { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LedgerError::IntegrityViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Partner(e) => match e {
                PartnerError::InvalidPartnerId(_) | PartnerError::EmptyName => {
                    StatusCode::BAD_REQUEST
                }
                PartnerError::DuplicatePartner(_) => StatusCode::CONFLICT,
                PartnerError::InvalidPolicy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub wallets: usize,
    pub ledger_entries: usize,
    /// Chain hash of the latest journal record.
    pub ledger_head: String,
    pub total_supply: u64,
    pub base_rate: f64,
    pub partners: usize,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

/// Body of `POST /wallets`. Omit `id` to get a generated one.
#[derive(Debug, Default, Deserialize)]
pub struct OpenWalletRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// A wallet as the API shows it.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub id: String,
    pub nonce: u64,
    pub balances: BTreeMap<String, u64>,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id().to_string(),
            nonce: wallet.nonce(),
            balances: wallet
                .balances()
                .into_iter()
                .map(|(asset, amount)| (asset.to_string(), amount))
                .collect(),
            created_at: wallet.created_at(),
        }
    }
}

/// Body of `POST /transfers`. `asset` defaults to `MERIT`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: u64,
    #[serde(default)]
    pub asset: Option<String>,
}

/// Body of `POST /mint`.
#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub wallet: String,
    pub usd_value: f64,
    #[serde(default)]
    pub partner_factor: Option<f64>,
}

/// Body of `POST /transactions`.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub partner_id: String,
    pub user_id: String,
    pub amount_usd: f64,
    #[serde(default)]
    pub reward_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Only records involving this wallet.
    pub wallet: Option<String>,
}

/// Response payload for `GET /ledger/verify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub entries: usize,
    pub ledger_head: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /partners`. Omit `partner_id` to get a generated UUID.
#[derive(Debug, Deserialize)]
pub struct RegisterPartnerRequest {
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(flatten)]
    pub profile: PartnerProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterPartnerResponse {
    pub record: PartnerRecord,
    pub assessment: PartnerAssessment,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /` — banner.
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OmniUtil API online" }))
}

/// `GET /health` — 200 while the process is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — summary counters.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let acct = &state.accounting;
    Json(StatusResponse {
        version: state.version.clone(),
        wallets: acct.wallets().len(),
        ledger_entries: acct.ledger().len(),
        ledger_head: acct.ledger().head_hash(),
        total_supply: acct.engine().total_supply(),
        base_rate: acct.engine().base_rate(),
        partners: state.partners.len(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// `POST /wallets`
async fn open_wallet_handler(
    State(state): State<AppState>,
    Json(req): Json<OpenWalletRequest>,
) -> ApiResult<(StatusCode, Json<WalletResponse>)> {
    let wallet = match req.id.as_deref() {
        Some(id) => state.accounting.open_wallet(id)?,
        None => state.accounting.open_generated_wallet()?,
    };
    set_gauge(
        &state.metrics.wallets,
        state.accounting.wallets().len() as u64,
    );
    Ok((StatusCode::CREATED, Json(wallet.into())))
}

/// `GET /wallets/:id`
async fn wallet_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<WalletResponse>> {
    Ok(Json(state.accounting.wallet(&id)?.into()))
}

/// `POST /transfers`
async fn transfer_handler(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<Json<LedgerRecord>> {
    let _timer = state.metrics.operation_latency_seconds.start_timer();

    let asset = match req.asset.as_deref() {
        Some(symbol) => AssetSymbol::new(symbol)?,
        None => AssetSymbol::merit(),
    };

    match state
        .accounting
        .transfer(&req.from, &req.to, req.amount, &asset)
    {
        Ok(record) => {
            state.metrics.transfers_total.inc();
            set_gauge(
                &state.metrics.ledger_entries,
                state.accounting.ledger().len() as u64,
            );
            Ok(Json(record))
        }
        Err(e) => {
            state.metrics.transfer_failures_total.inc();
            Err(e.into())
        }
    }
}

/// `POST /mint`
async fn mint_handler(
    State(state): State<AppState>,
    Json(req): Json<MintRequest>,
) -> ApiResult<Json<Issuance>> {
    let _timer = state.metrics.operation_latency_seconds.start_timer();

    let issuance = state.accounting.issue(
        &req.wallet,
        req.usd_value,
        req.partner_factor.unwrap_or(DEFAULT_PARTNER_FACTOR),
    )?;

    state.metrics.merit_minted_total.inc_by(issuance.minted);
    set_gauge(
        &state.metrics.total_supply,
        state.accounting.engine().total_supply(),
    );
    set_gauge(
        &state.metrics.ledger_entries,
        state.accounting.ledger().len() as u64,
    );
    Ok(Json(issuance))
}

/// `POST /transactions`
async fn transaction_handler(
    State(state): State<AppState>,
    Json(req): Json<TransactionRequest>,
) -> ApiResult<Json<TransactionRecord>> {
    let _timer = state.metrics.operation_latency_seconds.start_timer();

    let record = process_transaction(
        &state.accounting,
        &req.partner_id,
        &req.user_id,
        req.amount_usd,
        req.reward_rate.unwrap_or(DEFAULT_PARTNER_FACTOR),
    )?;

    state.metrics.merit_minted_total.inc_by(record.merit_generated);
    set_gauge(
        &state.metrics.total_supply,
        state.accounting.engine().total_supply(),
    );
    set_gauge(
        &state.metrics.ledger_entries,
        state.accounting.ledger().len() as u64,
    );
    Ok(Json(record))
}

/// `GET /ledger`
async fn ledger_handler(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Json<Vec<LedgerRecord>> {
    let ledger = state.accounting.ledger();
    Json(match query.wallet.as_deref() {
        Some(wallet) => ledger.records_for(wallet),
        None => ledger.records(),
    })
}

/// `GET /ledger/verify`
async fn verify_ledger_handler(State(state): State<AppState>) -> Json<VerifyResponse> {
    let ledger = state.accounting.ledger();
    let result = state.accounting.verify_ledger();
    if let Err(e) = &result {
        tracing::error!(error = %e, "ledger verification failed");
    }
    Json(VerifyResponse {
        valid: result.is_ok(),
        entries: ledger.len(),
        ledger_head: ledger.head_hash(),
        error: result.err().map(|e| e.to_string()),
    })
}

/// `POST /partners/inspect`
async fn inspect_partner_handler(
    State(state): State<AppState>,
    Json(checklist): Json<CapabilityChecklist>,
) -> Json<PartnerAssessment> {
    Json(inspect_partner(&checklist, &state.policy))
}

/// `POST /partners`
async fn register_partner_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterPartnerRequest>,
) -> ApiResult<(StatusCode, Json<RegisterPartnerResponse>)> {
    let partner_id = req
        .partner_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let assessment = inspect_partner(&req.profile.capabilities, &state.policy);
    let record = state
        .partners
        .register(&partner_id, req.profile, &assessment)?;

    set_gauge(&state.metrics.partners, state.partners.len() as u64);
    Ok((
        StatusCode::CREATED,
        Json(RegisterPartnerResponse { record, assessment }),
    ))
}

/// `GET /partners`
async fn list_partners_handler(State(state): State<AppState>) -> Json<Vec<PartnerRecord>> {
    Json(state.partners.list())
}

/// `POST /partners/onboarding`
async fn onboarding_handler(
    Json(req): Json<OnboardingRequest>,
) -> ApiResult<(StatusCode, Json<OnboardingTicket>)> {
    let ticket = OnboardingTicket::issue(&req.name)?;
    tracing::info!(partner = %ticket.partner_id, name = %ticket.name, "onboarding ticket issued");
    Ok((StatusCode::CREATED, Json(ticket)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
