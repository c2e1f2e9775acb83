//! Router and request handlers.
//!
//! `/play` always answers 200 with a badge; failures are reported inside the
//! badge so that the badge renderer can show them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Uri, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{Badge, BadgeRequest, BadgeService};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<BadgeService>,
    /// `max-age` of the `Cache-Control` header sent with `/play`.
    pub cache_control_max_age: u32,
}

impl AppState {
    pub fn new(service: Arc<BadgeService>, cache_control_max_age: u32) -> Self {
        Self {
            service,
            cache_control_max_age,
        }
    }
}

/// Build the full router with application state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/play", get(play))
        .route("/stats", get(stats))
        .route("/placeholders", get(placeholders))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Query parameters in order, keeping the first value of repeated names.
fn query_params(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

async fn play(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let query = uri.query().unwrap_or("");
    let signature = format!("{}{query}", uri.path());
    let request = BadgeRequest::from_query(&query_params(query));

    let badge = state.service.badge(&signature, &request).await;
    (
        [(
            header::CACHE_CONTROL,
            format!("max-age={}", state.cache_control_max_age),
        )],
        Json(Badge::clone(&badge)),
    )
}

async fn stats(State(state): State<AppState>) -> Json<Badge> {
    Json(state.service.stats())
}

async fn placeholders(
    State(state): State<AppState>,
) -> Json<BTreeMap<&'static str, &'static str>> {
    Json(state.service.descriptions())
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
    })
}
