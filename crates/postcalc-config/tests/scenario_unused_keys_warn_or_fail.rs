use postcalc_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigMode, UnusedKeyPolicy};

/// Unused-key guard.
///
/// Validates:
/// 1) Unused keys are reported in WARN mode without error.
/// 2) Unused keys fail in FAIL mode.
/// 3) Keys under consumed prefixes are not flagged.
/// 4) Observation lists count as one leaf.
/// 5) Unused pointers are sorted.

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let yaml = r#"
prior:
  mean: 1.0
noise:
  sd: 0.5
noize:
  sd: 0.1
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).expect("config load must succeed");
    let report = report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Warn)
        .expect("warn mode must not error");

    assert!(!report.is_clean());
    assert_eq!(report.unused_leaf_pointers, vec!["/noize/sd".to_string()]);
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let yaml = r#"
prior:
  mean: 1.0
unused_section:
  foo: 1
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let result = report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Fail);

    let msg = format!("{:?}", result.expect_err("fail policy must error"));
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn daemon_mode_does_not_consume_inputs() {
    let yaml = r#"
prior:
  mean: 1.0
plot:
  points: 100
daemon:
  addr: "127.0.0.1:9000"
"#;

    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();

    let cli = report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(cli.unused_leaf_pointers, vec!["/daemon/addr".to_string()]);

    let daemon =
        report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(daemon.unused_leaf_pointers, vec!["/prior/mean".to_string()]);
}

#[test]
fn observation_list_is_a_single_consumed_leaf() {
    let yaml = "observations: [1.0, 2.0, 3.0]\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}

#[test]
fn prefix_boundary_is_respected() {
    // "/prior" must not consume "/priors/..."
    let yaml = "priors:\n  mean: 1.0\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(report.unused_leaf_pointers, vec!["/priors/mean".to_string()]);
}

#[test]
fn deterministic_unused_pointer_ordering() {
    let yaml = "unused:\n  b: 2\n  a: 1\n";
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(ConfigMode::Cli, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();

    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/unused/a".to_string(), "/unused/b".to_string()]
    );
}

#[test]
fn empty_config_is_clean() {
    let loaded = load_layered_yaml_from_strings(&[]).unwrap();
    let report = report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
}
