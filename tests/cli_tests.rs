use std::path::Path;

use clap::Parser;

use element_discovery::cli::commands::{load_record, parse_record};
use element_discovery::cli::config::{AppConfig, Cli, Commands, load_config, parse_config, unknown_keys};
use element_discovery::error::ProbeError;
use element_discovery::exec::model::StepValue;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_discover() {
    let cli = Cli::parse_from(["element-discovery", "discover", "--url", "https://example.com"]);
    match cli.command {
        Commands::Discover { url, output } => {
            assert_eq!(url, "https://example.com");
            assert_eq!(output, None);
        }
        _ => panic!("Expected Discover command"),
    }
    assert_eq!(cli.verbose, 0);
    assert!(!cli.log_json);
}

#[test]
fn cli_parse_run_defaults() {
    let cli = Cli::parse_from(["element-discovery", "run", "--record", "run.yaml"]);
    match cli.command {
        Commands::Run {
            record,
            format,
            output,
            artifacts,
            headed,
        } => {
            assert_eq!(record, "run.yaml");
            assert_eq!(format, "console");
            assert_eq!(output, None);
            assert_eq!(artifacts, None);
            assert!(!headed);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_parse_run_all_args_and_globals() {
    let cli = Cli::parse_from([
        "element-discovery",
        "-vv",
        "--log-json",
        "--config",
        "custom.yaml",
        "run",
        "--record",
        "run.json",
        "--format",
        "junit",
        "-o",
        "report.xml",
        "--artifacts",
        "/tmp/shots",
        "--headed",
    ]);
    assert_eq!(cli.verbose, 2);
    assert!(cli.log_json);
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
    match cli.command {
        Commands::Run {
            format,
            output,
            artifacts,
            headed,
            ..
        } => {
            assert_eq!(format, "junit");
            assert_eq!(output.as_deref(), Some("report.xml"));
            assert_eq!(artifacts.as_deref(), Some("/tmp/shots"));
            assert!(headed);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["element-discovery"]).is_err());
    assert!(Cli::try_parse_from(["element-discovery", "discover"]).is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.browser.node_binary, "node");
    assert!(config.browser.headless);
    assert_eq!(config.browser.viewport_width, 1280);
    assert_eq!(config.engine.navigation_timeout_ms, 30_000);
    assert_eq!(config.engine.execution.act_timeout_ms, 5000);
    assert_eq!(config.engine.execution.fill_timeout_ms, 3000);
    assert_eq!(config.engine.execution.visible_timeout_ms, 5000);
    assert_eq!(config.engine.execution.focus_pause_ms, 100);
    assert_eq!(config.engine.execution.default_wait_ms, 1000);
    assert_eq!(config.engine.scan.max_elements, 80);
    assert_eq!(config.artifacts.directory, "artifacts");
}

#[test]
fn config_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
browser:
  headless: false
navigation_timeout_ms: 10000
execution:
  act_timeout_ms: 2500
scan:
  below_viewport_factor: 1.5
artifacts:
  directory: out/shots
"#;
    let config = parse_config(yaml).unwrap();
    assert!(!config.browser.headless);
    assert_eq!(config.browser.bridge_script, "node/playwright_bridge.js");
    assert_eq!(config.engine.navigation_timeout_ms, 10_000);
    assert_eq!(config.engine.execution.act_timeout_ms, 2500);
    assert_eq!(config.engine.execution.fill_timeout_ms, 3000);
    assert_eq!(config.engine.scan.below_viewport_factor, 1.5);
    assert_eq!(config.engine.readiness.settle_ms, 500);
    assert_eq!(config.artifacts.directory, "out/shots");
}

#[test]
fn config_nested_engine_section_is_reported_and_ignored() {
    let yaml = r#"
engine:
  scan:
    max_elements: 5
readiness:
  settle_ms: 250
"#;
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(unknown_keys(&value), vec!["engine".to_string()]);

    let config = parse_config(yaml).unwrap();
    assert_eq!(config.engine.scan.max_elements, 80);
    assert_eq!(config.engine.readiness.settle_ms, 250);
}

#[test]
fn config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/element-discovery.yaml"));
    assert_eq!(config.engine.navigation_timeout_ms, 30_000);
}

#[test]
fn config_malformed_file_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "browser: [not, a, map").unwrap();
    let config = load_config(path.to_str());
    assert!(config.browser.headless);
}

// ============================================================================
// Run Record Loading Tests
// ============================================================================

#[test]
fn record_loads_from_yaml() {
    let yaml = r#"
url: https://example.com/login
elements:
  - id: e0
    locator: input[type="email"]
    tag: input
    role: email_input
tests:
  - name: Login
    steps:
      - action: type
        target: e0
        value: test@example.com
      - action: wait
        value: 500
"#;
    let record = parse_record(yaml, Path::new("run.yaml")).unwrap();
    assert_eq!(record.url, "https://example.com/login");
    assert_eq!(record.elements.len(), 1);
    assert_eq!(record.tests[0].steps[0].value, Some(StepValue::Text("test@example.com".into())));
    assert_eq!(record.tests[0].steps[1].target, "");
    assert_eq!(record.tests[0].steps[1].value.as_ref().and_then(|v| v.as_millis()), Some(500));
}

#[test]
fn record_loads_from_json_with_page_data_alias() {
    let json = r#"{
        "url": "https://example.com",
        "pageData": [
            { "id": "e0", "locator": "button:text-is(\"Go\")", "tag": "button", "role": "button" }
        ],
        "tests": [ { "name": "Go", "steps": [ { "action": "click", "target": "e0" } ] } ]
    }"#;
    let record = parse_record(json, Path::new("run.JSON")).unwrap();
    assert_eq!(record.elements[0].locator, "button:text-is(\"Go\")");
    assert_eq!(record.tests[0].steps[0].action, "click");
}

#[test]
fn unknown_actions_survive_loading() {
    let yaml = "url: https://x.test\ntests:\n  - name: odd\n    steps:\n      - action: teleport\n        target: e0\n";
    let record = parse_record(yaml, Path::new("odd.yml")).unwrap();
    assert!(record.tests[0].steps[0].parsed_action().is_err());
}

#[test]
fn bad_json_record_is_a_parse_error() {
    let err = parse_record("{ not json", Path::new("run.json")).unwrap_err();
    assert!(matches!(err, ProbeError::JsonParse { .. }));
}

#[test]
fn missing_record_file_is_a_config_error() {
    let err = load_record("/nonexistent/run.yaml").unwrap_err();
    assert!(matches!(err, ProbeError::Config(_)));
}
