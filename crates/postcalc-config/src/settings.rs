//! Typed settings read from the merged config tree.
//!
//! Missing keys fall back to the calculator form defaults. A present key with
//! the wrong type is an error, never silently defaulted. Range checks on the
//! distribution parameters are left to `postcalc-core`, which reports them
//! as `InvalidParameter` at evaluation time.

use anyhow::{anyhow, bail, Context, Result};
use postcalc_core::{ObservationInput, DEFAULT_GRID_POINTS, DEFAULT_SPAN_SD};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_EXPORTS_ROOT: &str = "exports";
pub const DEFAULT_DAEMON_ADDR: &str = "127.0.0.1:8898";

/// Chart and grid settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSettings {
    /// Grid points per curve.
    pub points: usize,
    /// Domain half-width in standard deviations.
    pub span_sd: f64,
    /// Chart width in px.
    pub width: u32,
    /// Chart height in px.
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            points: DEFAULT_GRID_POINTS,
            span_sd: DEFAULT_SPAN_SD,
            // 10x6 in at 100 dpi
            width: 1000,
            height: 600,
        }
    }
}

impl PlotSettings {
    /// Grid needs two points and a finite, positive span. Checked at load
    /// time so a bad config fails before any request is served.
    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            bail!(
                "CONFIG_INVALID_VALUE pointer=/plot/points expected=>=2 got={}",
                self.points
            );
        }
        if !self.span_sd.is_finite() || self.span_sd <= 0.0 {
            bail!(
                "CONFIG_INVALID_VALUE pointer=/plot/span_sd expected=finite>0 got={}",
                self.span_sd
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorSettings {
    pub prior_mean: f64,
    pub prior_sd: f64,
    pub observations: ObservationInput,
    pub noise_sd: f64,
    pub plot: PlotSettings,
    pub exports_root: String,
    pub daemon_addr: String,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            prior_mean: 0.0,
            prior_sd: 1.0,
            observations: ObservationInput::Text("1.0".to_string()),
            noise_sd: 0.5,
            plot: PlotSettings::default(),
            exports_root: DEFAULT_EXPORTS_ROOT.to_string(),
            daemon_addr: DEFAULT_DAEMON_ADDR.to_string(),
        }
    }
}

impl CalculatorSettings {
    pub fn from_config_json(v: &Value) -> Result<Self> {
        let d = Self::default();

        let observations = match v.pointer("/observations") {
            None | Some(Value::Null) => d.observations,
            Some(raw) => serde_json::from_value::<ObservationInput>(raw.clone())
                .map_err(|_| invalid("/observations", "number, string or list of numbers"))?,
        };

        let plot = PlotSettings {
            points: read_usize(v, "/plot/points", d.plot.points)?,
            span_sd: read_f64(v, "/plot/span_sd", d.plot.span_sd)?,
            width: read_dimension(v, "/plot/width", d.plot.width)?,
            height: read_dimension(v, "/plot/height", d.plot.height)?,
        };
        plot.validate()?;

        Ok(Self {
            prior_mean: read_f64(v, "/prior/mean", d.prior_mean)?,
            prior_sd: read_f64(v, "/prior/sd", d.prior_sd)?,
            observations,
            noise_sd: read_f64(v, "/noise/sd", d.noise_sd)?,
            plot,
            exports_root: read_string(v, "/exports/root", &d.exports_root)?,
            daemon_addr: read_string(v, "/daemon/addr", &d.daemon_addr)?,
        })
    }
}

fn invalid(pointer: &str, expected: &str) -> anyhow::Error {
    anyhow!("CONFIG_INVALID_VALUE pointer={pointer} expected={expected}")
}

fn read_f64(v: &Value, pointer: &str, default: f64) -> Result<f64> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(default),
        Some(x) => x.as_f64().ok_or_else(|| invalid(pointer, "number")),
    }
}

fn read_usize(v: &Value, pointer: &str, default: usize) -> Result<usize> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(default),
        Some(x) => {
            let n = x
                .as_u64()
                .ok_or_else(|| invalid(pointer, "non-negative integer"))?;
            usize::try_from(n).with_context(|| format!("{pointer} out of range"))
        }
    }
}

fn read_dimension(v: &Value, pointer: &str, default: u32) -> Result<u32> {
    let n = read_usize(v, pointer, default as usize)?;
    if n == 0 || n > 10_000 {
        bail!("CONFIG_INVALID_VALUE pointer={pointer} expected=1..=10000 got={n}");
    }
    Ok(n as u32)
}

fn read_string(v: &Value, pointer: &str, default: &str) -> Result<String> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(x) => x
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| invalid(pointer, "string")),
    }
}
