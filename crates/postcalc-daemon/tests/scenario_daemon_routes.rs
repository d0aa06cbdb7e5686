//! In-process scenario tests for postcalc-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use postcalc_config::PlotSettings;
use postcalc_daemon::{routes, state};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::new(
        PlotSettings::default(),
        "test-hash".to_string(),
    ))
}

/// Drive the router with a single request and return (status, content-type, body_bytes).
async fn call(
    router: axum::Router,
    req: Request<axum::body::Body>,
) -> (StatusCode, Option<String>, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let ctype = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, ctype, body)
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let router = routes::build_router(make_state());
    let (status, _, body) = call(router, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "postcalc-daemon");
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// POST /v1/posterior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posterior_with_form_defaults_returns_reference_values() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0",
            "noise_sd": 0.5
        }),
    );

    let (status, ctype, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype.as_deref(), Some("application/json"));

    let json = parse_json(body);
    let mean = json["posterior_mean"].as_f64().unwrap();
    let sd = json["posterior_sd"].as_f64().unwrap();
    assert!((mean - 0.8).abs() < 1e-12, "mean={mean}");
    assert!((sd - 0.2f64.sqrt()).abs() < 1e-12, "sd={sd}");
    assert_eq!(json["display_mean"], "0.8000");
    assert_eq!(json["display_sd"], "0.4472");
    assert_eq!(json["observations"], serde_json::json!([1.0]));

    let md = json["summary_markdown"].as_str().unwrap();
    assert!(md.contains("### Observations"));
    assert!(md.contains("**Posterior Mean (μₚ)**: 0.8000"));
}

#[tokio::test]
async fn posterior_accepts_observation_array() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": [1.0, 2.0],
            "noise_sd": 1.0
        }),
    );

    let (status, _, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["display_mean"], "1.0000");
    assert_eq!(json["display_sd"], "0.5774");
    let var = json["posterior_variance"].as_f64().unwrap();
    assert!((var - 1.0 / 3.0).abs() < 1e-12);
}

#[tokio::test]
async fn posterior_rejects_nonpositive_sd_with_422() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 0.0,
            "observations": "1.0",
            "noise_sd": 0.5
        }),
    );

    let (status, _, body) = call(router, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json = parse_json(body);
    assert_eq!(json["kind"], "invalid_parameter");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Standard deviations must be positive numbers."));
}

#[tokio::test]
async fn posterior_rejects_unparseable_observations_with_422() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0, abc",
            "noise_sd": 0.5
        }),
    );

    let (status, _, body) = call(router, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let json = parse_json(body);
    assert_eq!(json["kind"], "invalid_observation");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input for observations. Please enter numbers separated by commas."));
}

// ---------------------------------------------------------------------------
// POST /v1/posterior/plot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plot_returns_svg_document() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior/plot",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0",
            "noise_sd": 0.5
        }),
    );

    let (status, ctype, body) = call(router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype.as_deref(), Some("image/svg+xml"));

    let svg = String::from_utf8(body.to_vec()).unwrap();
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("width=\"1000\""));
}

#[tokio::test]
async fn plot_with_invalid_input_returns_json_not_svg() {
    let router = routes::build_router(make_state());
    let req = post_json(
        "/v1/posterior/plot",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0",
            "noise_sd": -0.5
        }),
    );

    let (status, ctype, body) = call(router, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctype.as_deref(), Some("application/json"));
    assert_eq!(parse_json(body)["kind"], "invalid_parameter");
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_counts_served_and_rejected_requests() {
    let st = make_state();

    let ok = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": 2.5,
            "noise_sd": 0.5
        }),
    );
    let (status, _, _) = call(routes::build_router(Arc::clone(&st)), ok).await;
    assert_eq!(status, StatusCode::OK);

    let bad = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "",
            "noise_sd": 0.5
        }),
    );
    let (status, _, _) = call(routes::build_router(Arc::clone(&st)), bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, body) = call(routes::build_router(Arc::clone(&st)), get("/v1/status")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["requests_served"], 1);
    assert_eq!(json["requests_rejected"], 1);
    assert_eq!(json["plot_points"], 500);
    assert_eq!(json["config_hash"], "test-hash");
}

// ---------------------------------------------------------------------------
// Malformed bodies: same {error, kind} contract, counted as rejected
// ---------------------------------------------------------------------------

async fn assert_rejected_with_kind(st: &Arc<state::AppState>, req: Request<axum::body::Body>, kind: &str) {
    let (status, ctype, body) = call(routes::build_router(Arc::clone(st)), req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctype.as_deref(), Some("application/json"));
    let json = parse_json(body);
    assert_eq!(json["kind"], kind);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn non_numeric_item_in_observation_array_is_invalid_observation() {
    let st = make_state();
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": [1.0, "x"],
            "noise_sd": 0.5
        }),
    );
    assert_rejected_with_kind(&st, req, "invalid_observation").await;
    assert_eq!(st.requests_rejected(), 1);
}

#[tokio::test]
async fn null_or_missing_observations_are_invalid_observation() {
    let st = make_state();
    let null_obs = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": null,
            "noise_sd": 0.5
        }),
    );
    assert_rejected_with_kind(&st, null_obs, "invalid_observation").await;

    let missing = post_json(
        "/v1/posterior/plot",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "noise_sd": 0.5
        }),
    );
    assert_rejected_with_kind(&st, missing, "invalid_observation").await;
    assert_eq!(st.requests_rejected(), 2);
    assert_eq!(st.requests_served(), 0);
}

#[tokio::test]
async fn mistyped_or_missing_number_is_invalid_parameter() {
    let st = make_state();
    let string_sd = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": "wide",
            "observations": "1.0",
            "noise_sd": 0.5
        }),
    );
    assert_rejected_with_kind(&st, string_sd, "invalid_parameter").await;

    let no_noise = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0"
        }),
    );
    assert_rejected_with_kind(&st, no_noise, "invalid_parameter").await;
    assert_eq!(st.requests_rejected(), 2);
}

#[tokio::test]
async fn tiny_noise_sd_is_rejected_not_nan() {
    let st = make_state();
    let req = post_json(
        "/v1/posterior",
        serde_json::json!({
            "prior_mean": 0.0,
            "prior_sd": 1.0,
            "observations": "1.0",
            "noise_sd": 1e-200
        }),
    );
    assert_rejected_with_kind(&st, req, "invalid_parameter").await;
}

#[tokio::test]
async fn unparseable_json_body_is_json_error_and_counted() {
    let st = make_state();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/posterior")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, ctype, body) = call(routes::build_router(Arc::clone(&st)), req).await;
    assert!(status.is_client_error());
    assert_eq!(ctype.as_deref(), Some("application/json"));
    assert_eq!(parse_json(body)["kind"], "invalid_body");
    assert_eq!(st.requests_rejected(), 1);
}
