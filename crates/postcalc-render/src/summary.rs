use std::fmt;

use postcalc_core::Posterior;

/// 4-decimal display precision used for every reported parameter.
pub fn display4(v: f64) -> String {
    format!("{v:.4}")
}

/// Observations echoed in input order, `", "`-separated.
pub fn format_observations(observations: &[f64]) -> String {
    observations
        .iter()
        .map(|y| format!("{y:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Markdown result panel.
pub struct Summary<'a> {
    pub observations: &'a [f64],
    pub posterior: &'a Posterior,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### Observations")?;
        writeln!(f, "{}", format_observations(self.observations))?;
        writeln!(f)?;
        writeln!(f, "### Posterior Parameters")?;
        writeln!(
            f,
            "- **Posterior Mean (μₚ)**: {}",
            display4(self.posterior.mean())
        )?;
        write!(
            f,
            "- **Posterior Standard Deviation (σₚ)**: {}",
            display4(self.posterior.sd())
        )
    }
}
