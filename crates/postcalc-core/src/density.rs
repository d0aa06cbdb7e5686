//! Sampled prior/posterior densities for plotting.

use serde::Serialize;

use crate::{Gaussian, PosteriorError};

pub const DEFAULT_GRID_POINTS: usize = 500;
pub const DEFAULT_SPAN_SD: f64 = 4.0;

/// Plot domain covering `span_sd` standard deviations on both sides of each
/// distribution's mean.
pub fn plot_domain(
    prior: &Gaussian,
    posterior: &Gaussian,
    span_sd: f64,
) -> Result<(f64, f64), PosteriorError> {
    if !span_sd.is_finite() || span_sd <= 0.0 {
        return Err(PosteriorError::InvalidParameter {
            param: "span_sd",
            value: span_sd,
            constraint: "finite and > 0",
        });
    }
    let lo = (prior.mean - span_sd * prior.sd).min(posterior.mean - span_sd * posterior.sd);
    let hi = (prior.mean + span_sd * prior.sd).max(posterior.mean + span_sd * posterior.sd);
    Ok((lo, hi))
}

/// `n` evenly spaced points from `start` to `end`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut xs: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the endpoint; accumulated rounding must not shrink the domain.
            xs[n - 1] = end;
            xs
        }
    }
}

/// Prior and posterior pdf sampled on a shared grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub prior_pdf: Vec<f64>,
    pub posterior_pdf: Vec<f64>,
}

impl DensityGrid {
    pub fn build(
        prior: &Gaussian,
        posterior: &Gaussian,
        points: usize,
        span_sd: f64,
    ) -> Result<Self, PosteriorError> {
        if points < 2 {
            return Err(PosteriorError::InvalidParameter {
                param: "grid_points",
                value: points as f64,
                constraint: ">= 2",
            });
        }
        let (lo, hi) = plot_domain(prior, posterior, span_sd)?;
        let xs = linspace(lo, hi, points);
        let prior_pdf = xs.iter().map(|&x| prior.pdf(x)).collect();
        let posterior_pdf = xs.iter().map(|&x| posterior.pdf(x)).collect();
        Ok(Self {
            xs,
            prior_pdf,
            posterior_pdf,
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// (x_min, x_max)
    pub fn domain(&self) -> (f64, f64) {
        match (self.xs.first(), self.xs.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0.0, 0.0),
        }
    }

    /// Largest sampled density across both curves.
    pub fn max_density(&self) -> f64 {
        self.prior_pdf
            .iter()
            .chain(self.posterior_pdf.iter())
            .fold(0.0_f64, |m, &v| m.max(v))
    }

    /// Rows of `(x, prior_pdf, posterior_pdf)`.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.xs
            .iter()
            .zip(self.prior_pdf.iter())
            .zip(self.posterior_pdf.iter())
            .map(|((&x, &p), &q)| (x, p, q))
    }
}
