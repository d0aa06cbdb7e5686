//! postcalc-render
//!
//! Presentation for a computed posterior:
//! - `Summary`: Markdown result panel (observations + posterior parameters)
//! - `DensityChart`: SVG chart of the prior and posterior density curves
//!
//! Both are `Display` impls over borrowed data. No IO.

mod chart;
mod summary;

pub use chart::{ChartOptions, DensityChart, DEFAULT_TITLE};
pub use summary::{display4, format_observations, Summary};
