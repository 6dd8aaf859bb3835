//! HTTP Handlers
//!
//! Descriptor endpoints and the experiment API.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use beacon_vpn::{
    descriptor_for_experiment, render, Descriptor, Experiment, ExperimentError, HealthTable,
    Picker, ProbeOutcome, ProviderRegistry, Selector,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::store::ExperimentStore;

const NOT_FOUND: &str = "not found";
const TRY_AGAIN: &str = "try again later";
const HOME: &str = "nothing to see here";
const BAD_JSON: &str = "bad json request";

/// Largest endpoint count a stored experiment may ask for
pub const MAX_ENDPOINTS: usize = 100;

/// Application state shared across handlers
pub struct AppState {
    pub registry: ProviderRegistry,
    pub picker: Picker,
    pub experiments: ExperimentStore,
    /// Probe results per provider, also registered with the picker's health registry
    pub health_tables: BTreeMap<String, Arc<HealthTable>>,
    /// Expose error text instead of the generic message
    pub debug: bool,
}

impl AppState {
    fn error_text(&self, err: &dyn std::error::Error) -> String {
        if self.debug {
            err.to_string()
        } else {
            TRY_AGAIN.to_string()
        }
    }

    fn render_failed(&self, err: &dyn std::error::Error) -> Response {
        tracing::warn!("Descriptor rendering failed: {}", err);
        (StatusCode::GATEWAY_TIMEOUT, self.error_text(err)).into_response()
    }
}

/// `{ok, data}` envelope
#[derive(Serialize)]
pub struct ApiResult<T> {
    pub ok: bool,
    pub data: T,
}

impl<T> ApiResult<T> {
    fn ok(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/vpn/random/{provider}", get(random_handler))
        .route("/vpn/{cc}/{provider}", get(by_country_handler))
        .route("/api/experiment/add", post(add_experiment_handler))
        .route("/api/experiment/list", get(list_experiments_handler))
        .route("/api/experiment/{uuid}", get(get_experiment_handler))
        .route("/share/{uuid}", get(share_handler))
        .route("/api/health/{provider}", post(health_report_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `riseup.json` → `riseup`
fn provider_from_segment(segment: &str) -> Option<&str> {
    segment.strip_suffix(".json").filter(|name| !name.is_empty())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
}

fn render_for(state: &AppState, segment: &str, selector: Selector) -> Response {
    let Some(provider) = provider_from_segment(segment).and_then(|name| state.registry.get(name)) else {
        return not_found();
    };

    match render(provider.as_ref(), &selector, &state.picker) {
        Ok(descriptor) => Json::<Descriptor>(descriptor).into_response(),
        Err(e) => state.render_failed(&e),
    }
}

/// GET / - Placeholder page
pub async fn home_handler() -> &'static str {
    HOME
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.registry.names(),
    }))
}

/// GET /vpn/random/{provider}.json - One endpoint from anywhere
pub async fn random_handler(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
) -> Response {
    render_for(&state, &segment, Selector::random())
}

/// GET /vpn/{cc}/{provider}.json - One endpoint in a country
pub async fn by_country_handler(
    State(state): State<Arc<AppState>>,
    Path((cc, segment)): Path<(String, String)>,
) -> Response {
    render_for(&state, &segment, Selector::by_country(cc, 1))
}

/// POST /api/experiment/add - Store an experiment definition
pub async fn add_experiment_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let exp: Experiment = match serde_json::from_slice(&body) {
        Ok(exp) => exp,
        Err(e) => {
            tracing::debug!("Rejected experiment: {}", e);
            return (StatusCode::BAD_REQUEST, BAD_JSON).into_response();
        }
    };

    if exp.max_or_one() > MAX_ENDPOINTS {
        tracing::debug!("Rejected experiment asking for {} endpoints", exp.max);
        return (
            StatusCode::BAD_REQUEST,
            format!("max must be at most {MAX_ENDPOINTS}"),
        )
            .into_response();
    }

    let uuid = state.experiments.add(exp);
    tracing::info!("Added experiment {} ({} stored)", uuid, state.experiments.len());
    Json(ApiResult::ok(uuid)).into_response()
}

/// GET /api/experiment/list
pub async fn list_experiments_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(vec![ApiResult::ok(state.experiments.list())])
}

/// GET /api/experiment/{uuid} - Experiment definition (empty data if unknown)
pub async fn get_experiment_handler(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let data: Vec<Experiment> = state.experiments.get(&uuid).into_iter().collect();
    Json(vec![ApiResult::ok(data)])
}

/// GET /share/{uuid} - Descriptor for a stored experiment
pub async fn share_handler(State(state): State<Arc<AppState>>, Path(uuid): Path<String>) -> Response {
    let Some(exp) = state.experiments.get(&uuid) else {
        return not_found();
    };

    match descriptor_for_experiment(&exp, &state.registry, &state.picker) {
        Ok(descriptor) => Json(descriptor).into_response(),
        Err(ExperimentError::UnknownProvider(name)) => {
            tracing::debug!("Experiment {} references unknown provider {}", uuid, name);
            not_found()
        }
        Err(e @ ExperimentError::MalformedRemote(_)) => {
            (StatusCode::BAD_REQUEST, state.error_text(&e)).into_response()
        }
        Err(e) => state.render_failed(&e),
    }
}

/// One probe result pushed by an external prober
#[derive(Debug, Deserialize)]
pub struct ProbeReport {
    pub addr: SocketAddr,
    pub transport: String,
    pub reachable: bool,
    #[serde(default)]
    pub latency_ms: u64,
}

impl ProbeReport {
    fn outcome(&self) -> ProbeOutcome {
        if self.reachable {
            ProbeOutcome::Reachable {
                latency: Duration::from_millis(self.latency_ms),
            }
        } else {
            ProbeOutcome::Unreachable
        }
    }
}

/// POST /api/health/{provider} - Record probe results for a provider
pub async fn health_report_handler(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Response {
    let Some(table) = state.health_tables.get(&provider) else {
        return not_found();
    };

    let reports: Vec<ProbeReport> = match serde_json::from_slice(&body) {
        Ok(reports) => reports,
        Err(e) => {
            tracing::debug!("Rejected probe report for {}: {}", provider, e);
            return (StatusCode::BAD_REQUEST, BAD_JSON).into_response();
        }
    };

    for report in &reports {
        table.report(report.addr, &report.transport, report.outcome());
    }
    tracing::debug!("{}: recorded {} probe results", provider, reports.len());
    Json(ApiResult::ok(table.len())).into_response()
}
