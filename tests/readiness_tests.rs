use pretty_assertions::assert_eq;

use element_discovery::readiness::detector::{ReadinessConfig, ReadinessDetector};
use element_discovery::readiness::markers::{
    FRAMEWORK_MARKERS, LOADING_INDICATORS, content_ready_expression,
};

use crate::common::fake_driver::FakeDriver;

mod common;

#[test]
fn layers_run_in_order() {
    let mut driver = FakeDriver::new();
    let report = ReadinessDetector::default().settle(&mut driver);

    let layers: Vec<&str> = report.layers.iter().map(|l| l.layer.as_str()).collect();
    assert_eq!(
        layers,
        vec!["network-idle", "content", "settle", "lazy-scroll", "freeze-animations", "final-settle"]
    );
    assert!(report.fully_settled());

    assert_eq!(
        driver.state().calls,
        vec![
            "wait_network_idle",
            "wait_function",
            "pause 500",
            "evaluate",
            "pause 300",
            "evaluate",
            "pause 300",
            "add_style",
            "pause 300",
        ]
    );
}

#[test]
fn timed_out_layers_never_fail_the_settle() {
    let mut driver = FakeDriver::new()
        .failing("wait_network_idle", "*")
        .failing("wait_function", "*")
        .failing("add_style", "*");
    let report = ReadinessDetector::default().settle(&mut driver);

    assert_eq!(report.layers.len(), 6);
    assert!(!report.fully_settled());

    let unsatisfied: Vec<&str> = report
        .layers
        .iter()
        .filter(|l| !l.satisfied)
        .map(|l| l.layer.as_str())
        .collect();
    assert_eq!(unsatisfied, vec!["network-idle", "content", "freeze-animations"]);
    assert!(report.layers[0].error.as_deref().unwrap().contains("ActionTimeout"));

    // The final settle still ran after the failures
    assert_eq!(driver.state().calls.last().map(String::as_str), Some("pause 300"));
}

#[test]
fn total_failure_still_returns_a_report() {
    let mut driver = FakeDriver::new()
        .failing("wait_network_idle", "*")
        .failing("wait_function", "*")
        .failing("pause", "*")
        .failing("evaluate", "*")
        .failing("add_style", "*");
    let report = ReadinessDetector::default().settle(&mut driver);
    assert_eq!(report.layers.len(), 6);
    assert!(report.layers.iter().all(|l| !l.satisfied));
}

#[test]
fn delays_come_from_config() {
    let config = ReadinessConfig {
        settle_ms: 50,
        scroll_pause_ms: 10,
        final_settle_ms: 20,
        ..ReadinessConfig::default()
    };
    let mut driver = FakeDriver::new();
    ReadinessDetector::new(config).settle(&mut driver);
    assert_eq!(
        driver.state().calls_to("pause"),
        vec!["pause 50", "pause 10", "pause 10", "pause 20"]
    );
}

#[test]
fn content_predicate_lists_every_marker() {
    let expression = content_ready_expression(750);
    for marker in FRAMEWORK_MARKERS {
        for global in marker.globals {
            assert!(expression.contains(global), "missing global {}", global);
        }
    }
    assert!(expression.contains("__NEXT_DATA__"));
    assert!(expression.contains("[ng-version]"));
    assert!(expression.contains("const minBytes = 750;"));
    assert!(!LOADING_INDICATORS.is_empty());
    assert!(expression.trim_start().starts_with("(() =>"));
}

#[test]
fn readiness_config_defaults_from_empty_yaml() {
    let config: ReadinessConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.network_idle_timeout_ms, 5000);
    assert_eq!(config.content_timeout_ms, 8000);
    assert_eq!(config.min_body_bytes, 500);
    assert_eq!(config.settle_ms, 500);
}
