//! Axum router and all HTTP handlers for postcalc-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers are stateless apart from the request counters.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use postcalc_core::{evaluate, DensityGrid, Evaluation, PosteriorError};
use postcalc_render::DensityChart;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    api_types::{
        decode_posterior_request, HealthResponse, InputRejectedResponse, PosteriorResponse,
        StatusResponse,
    },
    state::{uptime_secs, AppState},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/posterior", post(posterior))
        .route("/v1/posterior/plot", post(posterior_plot))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            daemon_uptime_secs: uptime_secs(),
            requests_served: st.requests_served(),
            requests_rejected: st.requests_rejected(),
            plot_points: st.plot.points,
            plot_span_sd: st.plot.span_sd,
            config_hash: st.config_hash.clone(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/posterior
// ---------------------------------------------------------------------------

pub(crate) async fn posterior(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let ev = match evaluate_body(&st, payload) {
        Ok(ev) => ev,
        Err(resp) => return resp,
    };

    st.record_served();
    info!(
        n = ev.observations.len(),
        mean = ev.posterior.mean(),
        sd = ev.posterior.sd(),
        "posterior computed"
    );

    (StatusCode::OK, Json(PosteriorResponse::from_evaluation(&ev))).into_response()
}

// ---------------------------------------------------------------------------
// POST /v1/posterior/plot
// ---------------------------------------------------------------------------

/// Same inputs as `/v1/posterior`; responds with the SVG density chart.
pub(crate) async fn posterior_plot(
    State(st): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let ev = match evaluate_body(&st, payload) {
        Ok(ev) => ev,
        Err(resp) => return resp,
    };

    let svg = match render_svg(&st, &ev) {
        Ok(svg) => svg,
        Err(e) => return reject(&st, &e),
    };

    st.record_served();
    info!(
        n = ev.observations.len(),
        points = st.plot.points,
        "posterior plot rendered"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response()
}

/// Body → validated evaluation, or the rejection response (already counted).
fn evaluate_body(
    st: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Evaluation, Response> {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return Err(reject_body(st, rejection)),
    };
    decode_posterior_request(&body)
        .and_then(|req| evaluate(&req))
        .map_err(|e| reject(st, &e))
}

fn render_svg(st: &AppState, ev: &Evaluation) -> Result<String, PosteriorError> {
    let posterior = ev.posterior.as_gaussian();
    let grid = DensityGrid::build(
        &ev.prior.as_gaussian(),
        &posterior,
        st.plot.points,
        st.plot.span_sd,
    )?;
    let options = st.chart_options();
    let chart = DensityChart {
        grid: &grid,
        posterior,
        options: &options,
    };
    Ok(chart.to_string())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Body is not JSON at all (syntax, content type). Keeps the extractor's
/// status, reports it in the same `{error, kind}` shape.
fn reject_body(st: &AppState, rejection: JsonRejection) -> Response {
    st.record_rejected();
    let status = rejection.status();
    let error = rejection.body_text();
    warn!(%status, error = %error, "request body rejected");
    (
        status,
        Json(InputRejectedResponse {
            error,
            kind: "invalid_body".to_string(),
        }),
    )
        .into_response()
}

/// 422 with the validation message; nothing else is produced.
fn reject(st: &AppState, e: &PosteriorError) -> Response {
    st.record_rejected();
    warn!(kind = e.kind(), error = %e, "input rejected");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(InputRejectedResponse::from(e)),
    )
        .into_response()
}
