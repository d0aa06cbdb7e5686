//! Shared runtime state for postcalc-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. Every computation is
//! independent, so the only mutable state is a pair of atomic counters.

use std::sync::atomic::{AtomicU64, Ordering};

use postcalc_config::PlotSettings;
use postcalc_render::{ChartOptions, DEFAULT_TITLE};

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

pub struct AppState {
    pub build: BuildInfo,
    /// Grid + chart settings applied to every plot request.
    pub plot: PlotSettings,
    pub config_hash: String,
    served: AtomicU64,
    rejected: AtomicU64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PlotSettings::default(), String::new())
    }
}

impl AppState {
    pub fn new(plot: PlotSettings, config_hash: String) -> Self {
        // Anchor the uptime clock at boot.
        let _ = uptime_secs();
        Self {
            build: BuildInfo {
                service: "postcalc-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            plot,
            config_hash,
            served: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            width: self.plot.width,
            height: self.plot.height,
            title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn record_served(&self) {
        self.served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    pub fn requests_rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

/// Seconds since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}
