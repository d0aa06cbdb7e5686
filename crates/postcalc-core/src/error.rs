use std::fmt;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Input validation failures. Both are detected before any computation.
#[derive(Debug, Clone, PartialEq)]
pub enum PosteriorError {
    /// A distribution parameter is out of range (non-positive or non-finite sd,
    /// non-finite mean, degenerate plot grid).
    InvalidParameter {
        param: &'static str,
        value: f64,
        constraint: &'static str,
    },
    /// Observation data is absent or a token is not a real number.
    InvalidObservation {
        /// Zero-based token position, `None` when the whole input is unusable.
        index: Option<usize>,
        raw: String,
        reason: &'static str,
    },
}

impl PosteriorError {
    /// Stable machine-readable kind, used by the daemon's error body.
    pub fn kind(&self) -> &'static str {
        match self {
            PosteriorError::InvalidParameter { .. } => "invalid_parameter",
            PosteriorError::InvalidObservation { .. } => "invalid_observation",
        }
    }

    pub(crate) fn empty_observations() -> Self {
        PosteriorError::InvalidObservation {
            index: None,
            raw: String::new(),
            reason: "no observations supplied",
        }
    }
}

impl fmt::Display for PosteriorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosteriorError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                if matches!(*param, "prior_sd" | "noise_sd") {
                    write!(
                        f,
                        "Standard deviations must be positive numbers. \
                         ({param}={value}, expected {constraint})"
                    )
                } else {
                    write!(f, "Invalid parameter {param}={value}: expected {constraint}")
                }
            }
            PosteriorError::InvalidObservation { index, raw, reason } => {
                write!(
                    f,
                    "Invalid input for observations. Please enter numbers separated by commas. "
                )?;
                match index {
                    Some(i) => write!(f, "(token {i} '{raw}': {reason})"),
                    None => write!(f, "({reason})"),
                }
            }
        }
    }
}

impl std::error::Error for PosteriorError {}
