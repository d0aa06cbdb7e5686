//! postcalc-config
//!
//! Layered YAML configuration for the calculator surfaces.
//!
//! - Documents merge in order: earlier docs are base, later docs override.
//! - The merged tree is serialized as canonical JSON (sorted keys) and hashed
//!   with SHA-256 so exported runs can be attributed to an exact config.
//! - An unused-key guard reports leaves no surface reads (typos, stale keys).
//! - `CalculatorSettings` is the typed view with the form defaults.

mod settings;

pub use settings::{CalculatorSettings, PlotSettings, DEFAULT_DAEMON_ADDR, DEFAULT_EXPORTS_ROOT};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

// ---------------------------------------------------------------------------
// Consumption registry + unused-key guard
// ---------------------------------------------------------------------------

/// Which surface is reading the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    Cli,
    Daemon,
}

impl ConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMode::Cli => "CLI",
            ConfigMode::Daemon => "DAEMON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub mode: String,
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// JSON-pointer prefixes each surface actually reads.
///
/// Must match `CalculatorSettings::from_config_json` and its callers. A prefix
/// consumes its whole subtree ("/plot" consumes "/plot/points").
pub fn consumed_pointers_for_mode(mode: ConfigMode) -> &'static [&'static str] {
    match mode {
        // postcalc update: inputs, grid, chart, exports
        ConfigMode::Cli => &["/prior", "/noise", "/observations", "/plot", "/exports"],
        // daemon: inputs arrive per request; only grid, chart, bind address
        ConfigMode::Daemon => &["/plot", "/daemon"],
    }
}

/// Produce an unused-key report for a given mode.
/// If `policy == Fail`, returns an error when unused keys exist.
pub fn report_unused_keys(
    mode: ConfigMode,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers_for_mode(mode)
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        mode: mode.as_str().to_string(),
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (mode={}): {} unused config leaf key(s) detected. \
            Remove them or fix the key names. First few: {}",
            report.mode,
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Normalize JSON pointer: leading "/", no trailing "/" unless it is just "/".
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but NOT "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        // Arrays are values here (observation lists), not subtrees.
        _ => {
            if prefix.is_empty() {
                // An empty root document has nothing to report.
                if !matches!(v, Value::Object(_)) {
                    out.push("/".to_string());
                }
            } else {
                out.push(prefix.to_string());
            }
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

// ---------------------------------------------------------------------------
// Layered loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// No config files: empty tree, every setting at its default.
    pub fn empty() -> Result<Self> {
        load_layered_yaml_from_strings(&[])
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty YAML document parses as null; treat it as "no overrides".
        if v_json.is_null() {
            continue;
        }
        if !v_json.is_object() {
            bail!("config document root must be a mapping");
        }
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is BTreeMap-backed (no preserve_order feature), so keys
    // serialize sorted regardless of YAML source order.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
