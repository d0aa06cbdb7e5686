use serde::{Deserialize, Serialize};

use crate::PosteriorError;

/// 1 / sqrt(2π), the normal density normalizer.
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// `sd` must be finite and > 0, and its variance and precision must both be
/// representable (normal, finite). Otherwise the fold degrades to 0 * inf.
pub(crate) fn check_sd(param: &'static str, sd: f64) -> Result<(), PosteriorError> {
    if !sd.is_finite() || sd <= 0.0 {
        return Err(PosteriorError::InvalidParameter {
            param,
            value: sd,
            constraint: "finite and > 0",
        });
    }
    let variance = sd * sd;
    if !variance.is_normal() || !(1.0 / variance).is_finite() {
        return Err(PosteriorError::InvalidParameter {
            param,
            value: sd,
            constraint: "variance representable as a finite positive f64",
        });
    }
    Ok(())
}

pub(crate) fn check_finite(param: &'static str, value: f64) -> Result<(), PosteriorError> {
    if !value.is_finite() {
        return Err(PosteriorError::InvalidParameter {
            param,
            value,
            constraint: "finite",
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Gaussian
// ---------------------------------------------------------------------------

/// A univariate normal distribution N(mean, sd²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub mean: f64,
    pub sd: f64,
}

impl Gaussian {
    pub fn variance(&self) -> f64 {
        self.sd * self.sd
    }

    pub fn precision(&self) -> f64 {
        1.0 / self.variance()
    }

    /// Probability density at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mean) / self.sd;
        INV_SQRT_2PI / self.sd * (-0.5 * z * z).exp()
    }
}

// ---------------------------------------------------------------------------
// Prior
// ---------------------------------------------------------------------------

/// Belief over the unknown mean before any observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prior {
    mean: f64,
    sd: f64,
}

impl Prior {
    /// Validated prior. `sd` must be finite and > 0, `mean` finite.
    pub fn new(mean: f64, sd: f64) -> Result<Self, PosteriorError> {
        check_sd("prior_sd", sd)?;
        check_finite("prior_mean", mean)?;
        Ok(Self { mean, sd })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    pub fn variance(&self) -> f64 {
        self.sd * self.sd
    }

    pub fn as_gaussian(&self) -> Gaussian {
        Gaussian {
            mean: self.mean,
            sd: self.sd,
        }
    }
}

// ---------------------------------------------------------------------------
// NoiseModel
// ---------------------------------------------------------------------------

/// Observation noise, shared by every observation in a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseModel {
    sd: f64,
}

impl NoiseModel {
    pub fn new(sd: f64) -> Result<Self, PosteriorError> {
        check_sd("noise_sd", sd)?;
        Ok(Self { sd })
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    pub fn variance(&self) -> f64 {
        self.sd * self.sd
    }
}

// ---------------------------------------------------------------------------
// Posterior
// ---------------------------------------------------------------------------

/// Belief over the mean after folding in `n_observations` observations.
///
/// Only constructed by the updater, so `sd == variance.sqrt()` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Posterior {
    mean: f64,
    sd: f64,
    variance: f64,
    n_observations: usize,
}

impl Posterior {
    /// The zero-observation posterior, i.e. the prior itself.
    pub fn from_prior(prior: &Prior) -> Self {
        Self::from_moments(prior.mean(), prior.variance(), 0)
    }

    pub(crate) fn from_moments(mean: f64, variance: f64, n_observations: usize) -> Self {
        Self {
            mean,
            sd: variance.sqrt(),
            variance,
            n_observations,
        }
    }

    /// Fold one observation `y` into this belief.
    ///
    /// The old mean is weighted by the variance *before* this step; the new
    /// observation by the noise variance. Precisions add.
    pub fn step(&self, y: f64, noise: &NoiseModel) -> Self {
        let previous_variance = self.variance;
        let noise_variance = noise.variance();

        let variance = 1.0 / (1.0 / previous_variance + 1.0 / noise_variance);
        let mean = variance * (self.mean / previous_variance + y / noise_variance);

        Self::from_moments(mean, variance, self.n_observations + 1)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sd(&self) -> f64 {
        self.sd
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn as_gaussian(&self) -> Gaussian {
        Gaussian {
            mean: self.mean,
            sd: self.sd,
        }
    }
}
