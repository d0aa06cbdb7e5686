//! `postcalc update`: evaluate one posterior and optionally export it.
//!
//! Precedence: command-line flags > config layers > form defaults.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use postcalc_artifacts::{write_run_artifacts, PosteriorRecord, WriteRunArtifactsArgs};
use postcalc_config::{report_unused_keys, CalculatorSettings, ConfigMode, UnusedKeyPolicy};
use postcalc_core::{evaluate, update_trace, DensityGrid, ObservationInput, PosteriorRequest};
use postcalc_render::{display4, ChartOptions, Summary, DEFAULT_TITLE};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{get_git_hash, host_fingerprint, load_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `key=value` lines
    Kv,
    /// `posterior.json` record
    Json,
    /// Markdown result panel
    Markdown,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Layered config paths in merge order
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// Prior mean (μ₀)
    #[arg(long, allow_negative_numbers = true)]
    pub prior_mean: Option<f64>,

    /// Prior standard deviation (σ₀), > 0
    #[arg(long, allow_negative_numbers = true)]
    pub prior_sd: Option<f64>,

    /// Observations, comma-separated (e.g. "1.0, 2.5, -0.3")
    #[arg(long = "obs", allow_hyphen_values = true)]
    pub observations: Option<String>,

    /// Observation noise standard deviation (σ), > 0
    #[arg(long, allow_negative_numbers = true)]
    pub noise_sd: Option<f64>,

    /// Print the posterior after each observation
    #[arg(long, default_value_t = false)]
    pub trace: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Kv)]
    pub format: OutputFormat,

    /// Write manifest, posterior, summary, density grid and chart to <exports-root>/<run_id>/
    #[arg(long, default_value_t = false)]
    pub export: bool,

    /// Override exports root (config: /exports/root)
    #[arg(long)]
    pub exports_root: Option<PathBuf>,

    /// Fail (instead of warn) on config keys this command does not read
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

pub fn run_update(args: UpdateArgs) -> Result<()> {
    let loaded = load_config(&args.config_paths)?;

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(ConfigMode::Cli, &loaded.config_json, policy)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "config key not read by `postcalc update`");
    }

    let settings = CalculatorSettings::from_config_json(&loaded.config_json)
        .context("invalid config")?;

    let req = PosteriorRequest {
        prior_mean: args.prior_mean.unwrap_or(settings.prior_mean),
        prior_sd: args.prior_sd.unwrap_or(settings.prior_sd),
        observations: args
            .observations
            .map(ObservationInput::Text)
            .unwrap_or_else(|| settings.observations.clone()),
        noise_sd: args.noise_sd.unwrap_or(settings.noise_sd),
    };
    debug!(?req, config_hash = %loaded.config_hash, "update request");

    let ev = evaluate(&req)?;
    info!(
        n = ev.observations.len(),
        mean = ev.posterior.mean(),
        sd = ev.posterior.sd(),
        "posterior computed"
    );

    if args.trace {
        let trace = update_trace(&ev.prior, &ev.observations, &ev.noise)?;
        for (step, (y, p)) in ev.observations.iter().zip(trace.iter()).enumerate() {
            println!(
                "step={} y={:?} mean={} sd={}",
                step + 1,
                y,
                display4(p.mean()),
                display4(p.sd())
            );
        }
    }

    match args.format {
        OutputFormat::Kv => {
            println!("posterior_mean={}", display4(ev.posterior.mean()));
            println!("posterior_sd={}", display4(ev.posterior.sd()));
            println!("n_observations={}", ev.posterior.n_observations());
        }
        OutputFormat::Json => {
            let record = PosteriorRecord::from_evaluation(&ev);
            let json = serde_json::to_string_pretty(&record).context("serialize posterior failed")?;
            println!("{json}");
        }
        OutputFormat::Markdown => {
            let summary = Summary {
                observations: &ev.observations,
                posterior: &ev.posterior,
            };
            println!("{summary}");
        }
    }

    if args.export {
        let grid = DensityGrid::build(
            &ev.prior.as_gaussian(),
            &ev.posterior.as_gaussian(),
            settings.plot.points,
            settings.plot.span_sd,
        )
        .context("invalid plot settings")?;

        let chart = ChartOptions {
            width: settings.plot.width,
            height: settings.plot.height,
            title: DEFAULT_TITLE.to_string(),
        };

        let exports_root = args
            .exports_root
            .unwrap_or_else(|| PathBuf::from(&settings.exports_root));
        let run_id = Uuid::new_v4();
        let git_hash = get_git_hash().unwrap_or_else(|| "UNKNOWN".to_string());
        let host_fp = host_fingerprint();

        let out = write_run_artifacts(WriteRunArtifactsArgs {
            exports_root: &exports_root,
            run_id,
            git_hash: &git_hash,
            config_hash: &loaded.config_hash,
            host_fingerprint: &host_fp,
            evaluation: &ev,
            grid: &grid,
            chart: &chart,
        })?;

        info!(run_id = %run_id, run_dir = %out.run_dir.display(), "artifacts written");
        println!("run_id={run_id}");
        println!("run_dir={}", out.run_dir.display());
        println!("plot_path={}", out.plot_path.display());
    }

    Ok(())
}
