//! Command handler modules for postcalc-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod update;

use anyhow::Result;
use postcalc_config::LoadedConfig;
use std::process::Command;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load layered config; no paths means the empty tree (all defaults).
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    if paths.is_empty() {
        return LoadedConfig::empty();
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    postcalc_config::load_layered_yaml(&path_refs)
}

/// Best-effort git hash (short).
pub fn get_git_hash() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    Some(s.trim().to_string())
}

/// Non-sensitive host fingerprint for run attribution. Not a hardware id.
pub fn host_fingerprint() -> String {
    let hostname = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "UNKNOWN_HOST".to_string());
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "UNKNOWN_USER".to_string());
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    format!("{hostname}|{username}|{os}|{arch}")
}
