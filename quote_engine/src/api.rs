//! HTTP API for the quote engine.
//!
//! This module exposes the engine's function contracts as a small JSON
//! API using the [`axum`](https://crates.io/crates/axum) framework.
//! Every handler is a thin wrapper: it deserialises the request, calls
//! the matching core function and serialises the result.  The only
//! shared state is the set of tax profiles loaded at startup, which can
//! be reloaded from disk without restarting the server.

use crate::catalog::{find_service, CATALOG};
use crate::config::Settings;
use crate::currency::{convert, Currency, ExchangeRates};
use crate::engine::{run_quote, QuoteOutcome, QuoteRequest};
use crate::error::QuoteError;
use crate::fiscal::{resolver_codigo, sugerir_cfop, sugerir_cst, ContextoCfop, ContextoCst};
use crate::markup::{calcular_simulacao, ResultadoSimulacao, Simulacao};
use crate::models::Values;
use crate::tax::profile::TaxProfiles;
use crate::tax::{calculate_taxes, TaxCalculation, TaxRate};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;

/// Application state shared across requests.
pub struct AppState {
    pub tax_profile_dir: PathBuf,
    pub profiles: RwLock<TaxProfiles>,
}

impl AppState {
    pub fn new(tax_profile_dir: PathBuf, profiles: TaxProfiles) -> Self {
        Self {
            tax_profile_dir,
            profiles: RwLock::new(profiles),
        }
    }
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let status = match self {
            QuoteError::UnknownService { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

/// Build the API router and load the tax profiles from the given
/// directory.  Returns the router and a handle to the state.
pub async fn build_router(tax_profile_dir: PathBuf) -> Result<(Router, Arc<AppState>)> {
    let profiles = TaxProfiles::load(&tax_profile_dir)?;
    let state = Arc::new(AppState::new(tax_profile_dir, profiles));
    Ok((router(state.clone()), state))
}

/// Routes over an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/services", get(list_services_handler))
        .route("/api/services/:slug/calculate", post(calculate_service_handler))
        .route("/api/quote", post(quote_handler))
        .route("/api/taxes", post(taxes_handler))
        .route("/api/taxes/:uf", get(tax_profile_handler))
        .route("/api/tax-profiles/reload", post(reload_profiles_handler))
        .route("/api/simulacao", post(simulacao_handler))
        .route("/api/convert", post(convert_handler))
        .route("/api/fiscal/cfop", post(cfop_handler))
        .route("/api/fiscal/cst", post(cst_handler))
        .with_state(state)
}

/// Handler for GET /api/services
async fn list_services_handler() -> impl IntoResponse {
    Json(CATALOG)
}

/// Handler for POST /api/services/:slug/calculate
async fn calculate_service_handler(
    Path(slug): Path<String>,
    Json(raw): Json<Values>,
) -> Result<Json<Value>, QuoteError> {
    let service = find_service(&slug)?;
    let (quote, issues) = service.quote(&raw);
    let shares = quote.shares();
    Ok(Json(json!({"quote": quote, "shares": shares, "issues": issues})))
}

/// Handler for POST /api/quote
async fn quote_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteOutcome>, QuoteError> {
    let profiles = app_state.profiles.read().await;
    run_quote(&request, &profiles).map(Json)
}

#[derive(Debug, Deserialize)]
struct TaxesRequest {
    base: f64,
    #[serde(default)]
    uf: String,
    /// Omitted means the UF's profile.
    #[serde(default)]
    taxes: Option<Vec<TaxRate>>,
}

/// Handler for POST /api/taxes
async fn taxes_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<TaxesRequest>,
) -> Json<TaxCalculation> {
    let taxes = match request.taxes {
        Some(taxes) => taxes,
        None => app_state.profiles.read().await.taxes_for(&request.uf),
    };
    Json(calculate_taxes(request.base, &request.uf, &taxes))
}

/// Handler for GET /api/taxes/:uf
async fn tax_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Path(uf): Path<String>,
) -> Json<Vec<TaxRate>> {
    Json(app_state.profiles.read().await.taxes_for(&uf))
}

/// Handler for POST /api/tax-profiles/reload
async fn reload_profiles_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Value>, QuoteError> {
    let profiles = TaxProfiles::load(&app_state.tax_profile_dir)?;
    let loaded = profiles.len();
    *app_state.profiles.write().await = profiles;
    info!(loaded, "tax profiles reloaded");
    Ok(Json(json!({"loaded": loaded})))
}

#[derive(Debug, Deserialize)]
struct SimulacaoRequest {
    simulacao: Simulacao,
    #[serde(default)]
    uf: String,
}

/// Handler for POST /api/simulacao
async fn simulacao_handler(Json(request): Json<SimulacaoRequest>) -> Json<ResultadoSimulacao> {
    Json(calcular_simulacao(&request.simulacao, &request.uf))
}

#[derive(Debug, Deserialize)]
struct ConvertRequest {
    value: f64,
    from: Currency,
    to: Currency,
    #[serde(default)]
    rates: ExchangeRates,
}

/// Handler for POST /api/convert
async fn convert_handler(Json(request): Json<ConvertRequest>) -> Json<Value> {
    let value = convert(request.value, request.from, request.to, &request.rates);
    Json(json!({"value": value}))
}

#[derive(Debug, Deserialize)]
struct CfopRequest {
    #[serde(flatten)]
    contexto: ContextoCfop,
    #[serde(default)]
    codigo: Option<String>,
}

/// Handler for POST /api/fiscal/cfop
async fn cfop_handler(Json(request): Json<CfopRequest>) -> Json<Value> {
    let codigo = resolver_codigo(request.codigo.as_deref(), sugerir_cfop(&request.contexto));
    Json(json!({"codigo": codigo}))
}

#[derive(Debug, Deserialize)]
struct CstRequest {
    #[serde(flatten)]
    contexto: ContextoCst,
    #[serde(default)]
    codigo: Option<String>,
}

/// Handler for POST /api/fiscal/cst
async fn cst_handler(Json(request): Json<CstRequest>) -> Json<Value> {
    let codigo = resolver_codigo(request.codigo.as_deref(), sugerir_cst(&request.contexto));
    Json(json!({"codigo": codigo}))
}

/// Launch the API server.  This function builds the router from the
/// configured tax profile directory and binds to the configured
/// address.  It blocks until the server terminates.
pub async fn serve(settings: &Settings) -> Result<()> {
    let (router, state) = build_router(settings.tax_profile_dir.clone()).await?;
    let listener = TcpListener::bind(settings.bind_addr).await?;
    info!(
        addr = %settings.bind_addr,
        profiles = state.profiles.read().await.len(),
        "quote server listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
