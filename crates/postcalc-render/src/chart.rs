//! SVG density chart.
//!
//! Prior: dashed blue curve. Posterior: solid red curve over a 10% red fill,
//! with a dotted vertical line at the posterior mean.

use std::fmt;

use postcalc_core::{linspace, DensityGrid, Gaussian};

pub const DEFAULT_TITLE: &str = "Prior vs Posterior (conjugate Gaussian update)";

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 6;

const PRIOR_COLOR: &str = "#1f4fd1";
const POSTERIOR_COLOR: &str = "#d62728";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Prior vs posterior chart over a precomputed grid.
pub struct DensityChart<'a> {
    pub grid: &'a DensityGrid,
    pub posterior: Gaussian,
    pub options: &'a ChartOptions,
}

/// Data → pixel mapping for the plot area.
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    x_lo: f64,
    x_hi: f64,
    y_hi: f64,
}

impl Frame {
    fn px(&self, x: f64) -> f64 {
        let span = self.x_hi - self.x_lo;
        if span <= 0.0 {
            return (self.left + self.right) / 2.0;
        }
        self.left + (x - self.x_lo) / span * (self.right - self.left)
    }

    fn py(&self, y: f64) -> f64 {
        if self.y_hi <= 0.0 {
            return self.bottom;
        }
        self.bottom - y / self.y_hi * (self.bottom - self.top)
    }
}

impl DensityChart<'_> {
    fn frame(&self) -> Frame {
        let (x_lo, x_hi) = self.grid.domain();
        Frame {
            left: MARGIN_LEFT,
            right: f64::from(self.options.width) - MARGIN_RIGHT,
            top: MARGIN_TOP,
            bottom: f64::from(self.options.height) - MARGIN_BOTTOM,
            x_lo,
            x_hi,
            // headroom above the tallest peak
            y_hi: self.grid.max_density() * 1.05,
        }
    }

    fn polyline_points(frame: &Frame, xs: &[f64], ys: &[f64]) -> String {
        xs.iter()
            .zip(ys.iter())
            .map(|(&x, &y)| format!("{:.2},{:.2}", frame.px(x), frame.py(y)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn write_axes(&self, f: &mut fmt::Formatter<'_>, fr: &Frame) -> fmt::Result {
        writeln!(f, "  <g class=\"grid\" stroke=\"#dddddd\" stroke-width=\"1\">")?;
        for x in linspace(fr.x_lo, fr.x_hi, TICKS) {
            let px = fr.px(x);
            writeln!(
                f,
                "    <line x1=\"{px:.2}\" y1=\"{:.2}\" x2=\"{px:.2}\" y2=\"{:.2}\"/>",
                fr.top, fr.bottom
            )?;
        }
        for y in linspace(0.0, fr.y_hi, TICKS) {
            let py = fr.py(y);
            writeln!(
                f,
                "    <line x1=\"{:.2}\" y1=\"{py:.2}\" x2=\"{:.2}\" y2=\"{py:.2}\"/>",
                fr.left, fr.right
            )?;
        }
        writeln!(f, "  </g>")?;

        writeln!(
            f,
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#333333\"/>",
            fr.left,
            fr.top,
            fr.right - fr.left,
            fr.bottom - fr.top
        )?;

        for x in linspace(fr.x_lo, fr.x_hi, TICKS) {
            writeln!(
                f,
                "  <text x=\"{:.2}\" y=\"{:.2}\" class=\"tick\" text-anchor=\"middle\">{x:.2}</text>",
                fr.px(x),
                fr.bottom + 18.0
            )?;
        }
        for y in linspace(0.0, fr.y_hi, TICKS) {
            writeln!(
                f,
                "  <text x=\"{:.2}\" y=\"{:.2}\" class=\"tick\" text-anchor=\"end\">{y:.3}</text>",
                fr.left - 8.0,
                fr.py(y) + 4.0
            )?;
        }

        let mid_x = (fr.left + fr.right) / 2.0;
        let mid_y = (fr.top + fr.bottom) / 2.0;
        writeln!(
            f,
            "  <text x=\"{mid_x:.2}\" y=\"{:.2}\" class=\"label\" text-anchor=\"middle\">x</text>",
            fr.bottom + 45.0
        )?;
        writeln!(
            f,
            "  <text x=\"20\" y=\"{mid_y:.2}\" class=\"label\" text-anchor=\"middle\" transform=\"rotate(-90 20 {mid_y:.2})\">Probability Density</text>"
        )
    }

    fn write_legend(&self, f: &mut fmt::Formatter<'_>, fr: &Frame) -> fmt::Result {
        let x = fr.right - 190.0;
        let y = fr.top + 12.0;
        writeln!(
            f,
            "  <rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"180\" height=\"78\" fill=\"#ffffff\" fill-opacity=\"0.85\" stroke=\"#999999\"/>"
        )?;
        let entries = [
            ("Prior", PRIOR_COLOR, "stroke-dasharray=\"8 5\""),
            ("Posterior", POSTERIOR_COLOR, ""),
            ("Posterior Mean", POSTERIOR_COLOR, "stroke-dasharray=\"2 4\""),
        ];
        for (i, (label, color, dash)) in entries.iter().enumerate() {
            let ly = y + 20.0 + 22.0 * i as f64;
            writeln!(
                f,
                "  <line x1=\"{:.2}\" y1=\"{ly:.2}\" x2=\"{:.2}\" y2=\"{ly:.2}\" stroke=\"{color}\" stroke-width=\"2\" {dash}/>",
                x + 10.0,
                x + 45.0
            )?;
            writeln!(
                f,
                "  <text x=\"{:.2}\" y=\"{:.2}\" class=\"label\">{label}</text>",
                x + 55.0,
                ly + 4.0
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for DensityChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fr = self.frame();
        let w = self.options.width;
        let h = self.options.height;

        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            f,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        )?;
        writeln!(f, "  <style>")?;
        writeln!(f, "    .title {{ font-family: sans-serif; font-size: 18px; font-weight: bold; }}")?;
        writeln!(f, "    .label {{ font-family: sans-serif; font-size: 13px; }}")?;
        writeln!(f, "    .tick {{ font-family: monospace; font-size: 11px; fill: #444444; }}")?;
        writeln!(f, "  </style>")?;
        writeln!(f, "  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>")?;
        writeln!(
            f,
            "  <text x=\"{:.2}\" y=\"32\" class=\"title\" text-anchor=\"middle\">{}</text>",
            f64::from(w) / 2.0,
            escape_xml(&self.options.title)
        )?;

        self.write_axes(f, &fr)?;

        // Posterior fill: curve closed along the x axis.
        let curve = Self::polyline_points(&fr, &self.grid.xs, &self.grid.posterior_pdf);
        let (x_lo, x_hi) = self.grid.domain();
        writeln!(
            f,
            "  <polygon class=\"posterior-fill\" points=\"{:.2},{:.2} {curve} {:.2},{:.2}\" fill=\"{POSTERIOR_COLOR}\" fill-opacity=\"0.1\" stroke=\"none\"/>",
            fr.px(x_lo),
            fr.bottom,
            fr.px(x_hi),
            fr.bottom
        )?;

        writeln!(
            f,
            "  <polyline class=\"prior\" points=\"{}\" fill=\"none\" stroke=\"{PRIOR_COLOR}\" stroke-width=\"2\" stroke-dasharray=\"8 5\"/>",
            Self::polyline_points(&fr, &self.grid.xs, &self.grid.prior_pdf)
        )?;
        writeln!(
            f,
            "  <polyline class=\"posterior\" points=\"{curve}\" fill=\"none\" stroke=\"{POSTERIOR_COLOR}\" stroke-width=\"2\"/>"
        )?;

        let mx = fr.px(self.posterior.mean);
        writeln!(
            f,
            "  <line class=\"posterior-mean\" x1=\"{mx:.2}\" y1=\"{:.2}\" x2=\"{mx:.2}\" y2=\"{:.2}\" stroke=\"{POSTERIOR_COLOR}\" stroke-width=\"1.5\" stroke-dasharray=\"2 4\"/>",
            fr.top,
            fr.bottom
        )?;

        self.write_legend(f, &fr)?;
        writeln!(f, "</svg>")
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
