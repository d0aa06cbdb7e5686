//! Per-run export directory.
//!
//! `<exports_root>/<run_id>/`
//! - `manifest.json`   run attribution + artifact list
//! - `posterior.json`  inputs, posterior, 4-decimal display values
//! - `summary.md`      Markdown result panel
//! - `density.csv`     `x,prior_pdf,posterior_pdf`
//! - `plot.svg`        prior vs posterior chart

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use postcalc_core::{DensityGrid, Evaluation};
use postcalc_render::{display4, ChartOptions, DensityChart, Summary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub git_hash: String,
    pub config_hash: String,
    pub host_fingerprint: String,
    pub created_at_utc: DateTime<Utc>,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactList {
    pub manifest_json: String,
    pub posterior_json: String,
    pub summary_md: String,
    pub density_csv: String,
    pub plot_svg: String,
}

impl Default for ArtifactList {
    fn default() -> Self {
        Self {
            manifest_json: "manifest.json".to_string(),
            posterior_json: "posterior.json".to_string(),
            summary_md: "summary.md".to_string(),
            density_csv: "density.csv".to_string(),
            plot_svg: "plot.svg".to_string(),
        }
    }
}

/// Contents of `posterior.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorRecord {
    pub prior_mean: f64,
    pub prior_sd: f64,
    pub noise_sd: f64,
    pub observations: Vec<f64>,
    pub posterior_mean: f64,
    pub posterior_sd: f64,
    pub posterior_variance: f64,
    pub display_mean: String,
    pub display_sd: String,
}

impl PosteriorRecord {
    pub fn from_evaluation(ev: &Evaluation) -> Self {
        Self {
            prior_mean: ev.prior.mean(),
            prior_sd: ev.prior.sd(),
            noise_sd: ev.noise.sd(),
            observations: ev.observations.clone(),
            posterior_mean: ev.posterior.mean(),
            posterior_sd: ev.posterior.sd(),
            posterior_variance: ev.posterior.variance(),
            display_mean: display4(ev.posterior.mean()),
            display_sd: display4(ev.posterior.sd()),
        }
    }
}

pub struct WriteRunArtifactsArgs<'a> {
    pub exports_root: &'a Path, // e.g. ./exports
    pub run_id: Uuid,
    pub git_hash: &'a str,
    pub config_hash: &'a str,
    pub host_fingerprint: &'a str,
    pub evaluation: &'a Evaluation,
    pub grid: &'a DensityGrid,
    pub chart: &'a ChartOptions,
}

pub struct RunArtifacts {
    pub run_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub posterior_path: PathBuf,
    pub summary_path: PathBuf,
    pub density_path: PathBuf,
    pub plot_path: PathBuf,
}

pub fn write_run_artifacts(args: WriteRunArtifactsArgs<'_>) -> Result<RunArtifacts> {
    let run_dir = args.exports_root.join(args.run_id.to_string());
    let list = ArtifactList::default();
    let manifest_path = run_dir.join(&list.manifest_json);
    if manifest_path.exists() {
        bail!(
            "RUN_DIR_EXISTS: refusing to overwrite {}",
            manifest_path.display()
        );
    }
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let ev = args.evaluation;

    let posterior_path = run_dir.join(&list.posterior_json);
    write_json(&posterior_path, &PosteriorRecord::from_evaluation(ev))?;

    let summary_path = run_dir.join(&list.summary_md);
    let summary = Summary {
        observations: &ev.observations,
        posterior: &ev.posterior,
    };
    fs::write(&summary_path, format!("{summary}\n"))
        .with_context(|| format!("write summary failed: {}", summary_path.display()))?;

    let density_path = run_dir.join(&list.density_csv);
    write_density_csv(&density_path, args.grid)?;

    let plot_path = run_dir.join(&list.plot_svg);
    let chart = DensityChart {
        grid: args.grid,
        posterior: ev.posterior.as_gaussian(),
        options: args.chart,
    };
    fs::write(&plot_path, chart.to_string())
        .with_context(|| format!("write plot failed: {}", plot_path.display()))?;

    // Manifest last: its presence marks a complete run dir.
    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        run_id: args.run_id,
        git_hash: args.git_hash.to_string(),
        config_hash: args.config_hash.to_string(),
        host_fingerprint: args.host_fingerprint.to_string(),
        created_at_utc: Utc::now(),
        artifacts: list,
    };
    write_json(&manifest_path, &manifest)?;

    Ok(RunArtifacts {
        run_dir,
        manifest_path,
        posterior_path,
        summary_path,
        density_path,
        plot_path,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize failed: {}", path.display()))?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write failed: {}", path.display()))
}

fn write_density_csv(path: &Path, grid: &DensityGrid) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("open density csv failed: {}", path.display()))?;
    wtr.write_record(["x", "prior_pdf", "posterior_pdf"])?;
    for row in grid.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()
        .with_context(|| format!("flush density csv failed: {}", path.display()))?;
    Ok(())
}
