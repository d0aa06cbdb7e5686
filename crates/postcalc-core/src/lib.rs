//! postcalc-core
//!
//! Posterior updater for a Gaussian mean under a Gaussian prior and
//! Gaussian-noise observations.
//!
//! Goals:
//! - Validated prior / noise inputs (strictly positive, finite sds)
//! - Observation parsing from a scalar or comma-delimited text
//! - Sequential conjugate update (exact, closed form, no iteration)
//! - Density grid for plotting prior vs posterior
//!
//! Deterministic, pure logic. No IO, no time, no logging.
//!
//! Not variational inference: nothing is optimized here, the posterior is the
//! exact conjugate result.

mod density;
mod engine;
mod error;
mod observations;
mod types;

pub use density::{linspace, plot_domain, DensityGrid, DEFAULT_GRID_POINTS, DEFAULT_SPAN_SD};
pub use engine::{
    closed_form, evaluate, update, update_trace, update_with, Evaluation, PosteriorRequest,
};
pub use error::PosteriorError;
pub use observations::{parse_observations, ObservationInput};
pub use types::*;
