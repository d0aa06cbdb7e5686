use serde::{Deserialize, Serialize};

use crate::{NoiseModel, ObservationInput, Posterior, PosteriorError, Prior};

// ---------------------------------------------------------------------------
// Request pipeline
// ---------------------------------------------------------------------------

/// One posterior computation, as supplied by the CLI or the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorRequest {
    pub prior_mean: f64,
    pub prior_sd: f64,
    pub observations: ObservationInput,
    pub noise_sd: f64,
}

/// Validated inputs plus the resulting posterior.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub prior: Prior,
    pub noise: NoiseModel,
    pub observations: Vec<f64>,
    pub posterior: Posterior,
}

/// Resolve observations, validate parameters, fold.
///
/// Observations are checked first, then the standard deviations.
pub fn evaluate(req: &PosteriorRequest) -> Result<Evaluation, PosteriorError> {
    let observations = req.observations.resolve()?;
    let prior = Prior::new(req.prior_mean, req.prior_sd)?;
    let noise = NoiseModel::new(req.noise_sd)?;
    let posterior = update_with(&prior, &observations, &noise)?;
    Ok(Evaluation {
        prior,
        noise,
        observations,
        posterior,
    })
}

// ---------------------------------------------------------------------------
// Core update
// ---------------------------------------------------------------------------

/// Sequential conjugate update over raw parameters.
///
/// Fails with `InvalidParameter` when `prior_sd <= 0` or `noise_sd <= 0`
/// (no computation attempted), and with `InvalidObservation` when
/// `observations` is empty or holds a non-finite value.
pub fn update(
    prior_mean: f64,
    prior_sd: f64,
    observations: &[f64],
    noise_sd: f64,
) -> Result<Posterior, PosteriorError> {
    let prior = Prior::new(prior_mean, prior_sd)?;
    let noise = NoiseModel::new(noise_sd)?;
    update_with(&prior, observations, &noise)
}

/// Typed form of [`update`].
pub fn update_with(
    prior: &Prior,
    observations: &[f64],
    noise: &NoiseModel,
) -> Result<Posterior, PosteriorError> {
    check_observations(observations)?;
    let posterior = observations
        .iter()
        .fold(Posterior::from_prior(prior), |post, &y| post.step(y, noise));
    check_posterior(&posterior)?;
    Ok(posterior)
}

/// The posterior after each observation, in sequence order.
///
/// `trace.last()` equals [`update_with`] on the same inputs.
pub fn update_trace(
    prior: &Prior,
    observations: &[f64],
    noise: &NoiseModel,
) -> Result<Vec<Posterior>, PosteriorError> {
    check_observations(observations)?;
    let mut current = Posterior::from_prior(prior);
    let mut trace = Vec::with_capacity(observations.len());
    for &y in observations {
        current = current.step(y, noise);
        check_posterior(&current)?;
        trace.push(current);
    }
    Ok(trace)
}

/// Batch conjugate posterior for n independent observations with equal noise:
/// `var_n = 1 / (1/σ0² + n/σ²)`, `mean_n = var_n (μ0/σ0² + Σy/σ²)`.
pub fn closed_form(
    prior: &Prior,
    observations: &[f64],
    noise: &NoiseModel,
) -> Result<Posterior, PosteriorError> {
    check_observations(observations)?;
    let n = observations.len();
    let sum: f64 = observations.iter().sum();
    let noise_variance = noise.variance();

    let precision = 1.0 / prior.variance() + n as f64 / noise_variance;
    let variance = 1.0 / precision;
    let mean = variance * (prior.mean() / prior.variance() + sum / noise_variance);
    let posterior = Posterior::from_moments(mean, variance, n);
    check_posterior(&posterior)?;
    Ok(posterior)
}

fn check_observations(observations: &[f64]) -> Result<(), PosteriorError> {
    if observations.is_empty() {
        return Err(PosteriorError::empty_observations());
    }
    if let Some((i, v)) = observations.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PosteriorError::InvalidObservation {
            index: Some(i),
            raw: v.to_string(),
            reason: "not a finite number",
        });
    }
    Ok(())
}

/// Validated inputs can still overflow when combined (e.g. `y / σ²` past
/// f64::MAX). Never hand back a non-finite or zero-width posterior.
fn check_posterior(p: &Posterior) -> Result<(), PosteriorError> {
    if !p.mean().is_finite() {
        return Err(PosteriorError::InvalidParameter {
            param: "posterior_mean",
            value: p.mean(),
            constraint: "finite (inputs too large to combine)",
        });
    }
    if !p.variance().is_normal() {
        return Err(PosteriorError::InvalidParameter {
            param: "posterior_variance",
            value: p.variance(),
            constraint: "finite and > 0 (inputs too extreme to combine)",
        });
    }
    Ok(())
}
