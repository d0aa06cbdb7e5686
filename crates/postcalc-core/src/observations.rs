//! Observation input parsing.
//!
//! Accepts a single scalar or comma-delimited text (e.g. `"1.0, 2.5,-3"`).
//! Every token must be a finite real; an empty token anywhere rejects the
//! whole input. No partial results.

use serde::{Deserialize, Serialize};

use crate::PosteriorError;

/// Raw observation input as it arrives from a caller.
///
/// JSON bodies may carry a number, a string, or an array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationInput {
    Scalar(f64),
    List(Vec<f64>),
    Text(String),
}

impl ObservationInput {
    /// Resolve to an ordered, non-empty sequence of finite reals.
    pub fn resolve(&self) -> Result<Vec<f64>, PosteriorError> {
        match self {
            ObservationInput::Scalar(v) => {
                check_value(0, *v, || v.to_string())?;
                Ok(vec![*v])
            }
            ObservationInput::List(vs) => {
                if vs.is_empty() {
                    return Err(PosteriorError::empty_observations());
                }
                for (i, v) in vs.iter().enumerate() {
                    check_value(i, *v, || v.to_string())?;
                }
                Ok(vs.clone())
            }
            ObservationInput::Text(s) => parse_observations(s),
        }
    }
}

impl From<&str> for ObservationInput {
    fn from(s: &str) -> Self {
        ObservationInput::Text(s.to_string())
    }
}

impl From<f64> for ObservationInput {
    fn from(v: f64) -> Self {
        ObservationInput::Scalar(v)
    }
}

/// Parse comma-delimited observation text.
pub fn parse_observations(text: &str) -> Result<Vec<f64>, PosteriorError> {
    if text.trim().is_empty() {
        return Err(PosteriorError::empty_observations());
    }

    let mut out = Vec::new();
    for (i, token) in text.split(',').enumerate() {
        let t = token.trim();
        if t.is_empty() {
            return Err(PosteriorError::InvalidObservation {
                index: Some(i),
                raw: token.to_string(),
                reason: "empty value",
            });
        }
        let v: f64 = t.parse().map_err(|_| PosteriorError::InvalidObservation {
            index: Some(i),
            raw: t.to_string(),
            reason: "not a number",
        })?;
        check_value(i, v, || t.to_string())?;
        out.push(v);
    }
    Ok(out)
}

fn check_value(
    index: usize,
    v: f64,
    raw: impl FnOnce() -> String,
) -> Result<(), PosteriorError> {
    if !v.is_finite() {
        return Err(PosteriorError::InvalidObservation {
            index: Some(index),
            raw: raw(),
            reason: "not a finite number",
        });
    }
    Ok(())
}
