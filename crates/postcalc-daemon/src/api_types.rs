//! Request and response types for all postcalc-daemon HTTP endpoints.
//!
//! The request body carries the `postcalc_core::PosteriorRequest` fields;
//! `observations` may be a number, a comma-delimited string, or an array of
//! numbers. Bodies are decoded leniently so every bad field maps to a `kind`.

use postcalc_core::{Evaluation, ObservationInput, PosteriorError, PosteriorRequest};
use postcalc_render::{display4, Summary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub daemon_uptime_secs: u64,
    pub requests_served: u64,
    pub requests_rejected: u64,
    pub plot_points: usize,
    pub plot_span_sd: f64,
    /// Hash of the config the daemon booted with.
    pub config_hash: String,
}

// ---------------------------------------------------------------------------
// /v1/posterior
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorResponse {
    pub observations: Vec<f64>,
    pub posterior_mean: f64,
    pub posterior_sd: f64,
    pub posterior_variance: f64,
    /// 4-decimal display values
    pub display_mean: String,
    pub display_sd: String,
    pub summary_markdown: String,
}

impl PosteriorResponse {
    pub fn from_evaluation(ev: &Evaluation) -> Self {
        let summary = Summary {
            observations: &ev.observations,
            posterior: &ev.posterior,
        };
        Self {
            observations: ev.observations.clone(),
            posterior_mean: ev.posterior.mean(),
            posterior_sd: ev.posterior.sd(),
            posterior_variance: ev.posterior.variance(),
            display_mean: display4(ev.posterior.mean()),
            display_sd: display4(ev.posterior.sd()),
            summary_markdown: summary.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request decoding
// ---------------------------------------------------------------------------

/// Decode a `/v1/posterior*` body field by field, so a missing or mistyped
/// field is reported as the same `PosteriorError` the updater would raise.
///
/// Observations are checked before the numeric parameters, matching
/// `postcalc_core::evaluate`.
pub fn decode_posterior_request(body: &Value) -> Result<PosteriorRequest, PosteriorError> {
    let observations = decode_observations(body.get("observations"))?;
    Ok(PosteriorRequest {
        prior_mean: decode_number(body, "prior_mean")?,
        prior_sd: decode_number(body, "prior_sd")?,
        observations,
        noise_sd: decode_number(body, "noise_sd")?,
    })
}

fn decode_observations(v: Option<&Value>) -> Result<ObservationInput, PosteriorError> {
    match v {
        None | Some(Value::Null) => Err(PosteriorError::InvalidObservation {
            index: None,
            raw: String::new(),
            reason: "no observations supplied",
        }),
        Some(Value::Number(n)) => n.as_f64().map(ObservationInput::Scalar).ok_or_else(|| {
            PosteriorError::InvalidObservation {
                index: Some(0),
                raw: n.to_string(),
                reason: "not a number",
            }
        }),
        Some(Value::String(s)) => Ok(ObservationInput::Text(s.clone())),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_f64().ok_or_else(|| PosteriorError::InvalidObservation {
                    index: Some(i),
                    raw: item.to_string(),
                    reason: "not a number",
                })
            })
            .collect::<Result<Vec<f64>, _>>()
            .map(ObservationInput::List),
        Some(other) => Err(PosteriorError::InvalidObservation {
            index: None,
            raw: other.to_string(),
            reason: "expected a number, a comma-separated string or a list of numbers",
        }),
    }
}

fn decode_number(body: &Value, field: &'static str) -> Result<f64, PosteriorError> {
    body.get(field)
        .and_then(Value::as_f64)
        .ok_or(PosteriorError::InvalidParameter {
            param: field,
            value: f64::NAN,
            constraint: "a JSON number",
        })
}

// ---------------------------------------------------------------------------
// Input rejection (422)
// ---------------------------------------------------------------------------

/// Body returned when inputs fail validation. No plot accompanies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRejectedResponse {
    pub error: String,
    /// "invalid_parameter" | "invalid_observation" | "invalid_body"
    pub kind: String,
}

impl From<&PosteriorError> for InputRejectedResponse {
    fn from(e: &PosteriorError) -> Self {
        Self {
            error: e.to_string(),
            kind: e.kind().to_string(),
        }
    }
}
