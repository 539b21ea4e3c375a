use element_discovery::exec::model::{ExecutionResult, Step, TestStatus};
use element_discovery::report::console::format_console_report;
use element_discovery::report::junit::{escape_xml, generate_junit_xml};
use element_discovery::report::report_model::RunReport;

// ============================================================================
// Helper builders
// ============================================================================

fn passing_result(name: &str) -> ExecutionResult {
    ExecutionResult {
        name: name.to_string(),
        status: TestStatus::Pass,
        screenshots: vec!["shots/before.png".into(), "shots/after.png".into()],
        error: None,
        steps: vec![Step::new("click", "e2")],
        steps_run: 1,
        duration_ms: 812,
    }
}

fn failing_result(name: &str) -> ExecutionResult {
    ExecutionResult {
        name: name.to_string(),
        status: TestStatus::Fail,
        screenshots: vec!["shots/before.png".into(), "shots/error.png".into()],
        error: Some(
            "Step 0 (click 'e99') failed while locating: ElementNotFound: target 'e99' (resolved locator 'e99') matched no element".into(),
        ),
        steps: vec![Step::new("click", "e99"), Step::new("click", "e2")],
        steps_run: 1,
        duration_ms: 422,
    }
}

fn mixed_report() -> RunReport {
    RunReport::from_results(
        "https://example.com/login",
        vec![
            passing_result("Login"),
            passing_result("Logout"),
            failing_result("Missing <button>"),
        ],
    )
}

// ============================================================================
// 1. Report counts
// ============================================================================

#[test]
fn report_from_results_counts() {
    let report = mixed_report();
    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.all_passed());
    assert_eq!(report.duration_ms, None);
}

#[test]
fn empty_report_passes() {
    let report = RunReport::from_results("https://example.com", vec![]);
    assert!(report.all_passed());
    assert_eq!(report.total, 0);
}

// ============================================================================
// 2. Console output
// ============================================================================

#[test]
fn console_report_lists_each_test() {
    let out = format_console_report(&mixed_report().with_duration(1500));
    assert!(out.contains("=== Run: https://example.com/login ==="));
    assert!(out.contains("\u{2713} PASS  Login (1/1 steps, 2 screenshots)"));
    assert!(out.contains("\u{2717} FAIL  Missing <button> (1/2 steps, 2 screenshots)"));
    assert!(out.contains("[ERROR] Step 0 (click 'e99')"));
    assert!(out.contains("[SHOT] shots/error.png"));
    assert!(out.contains("=== Results: 2 passed, 1 failed (3 total) in 1.5s ==="));
}

#[test]
fn console_report_hides_screenshots_of_passing_tests() {
    let report = RunReport::from_results("https://example.com", vec![passing_result("Login")]);
    let out = format_console_report(&report);
    assert!(!out.contains("[SHOT]"));
    assert!(out.ends_with("(1 total) ===\n"));
}

// ============================================================================
// 3. JUnit XML
// ============================================================================

#[test]
fn junit_has_suite_and_cases() {
    let xml = generate_junit_xml(&mixed_report().with_duration(1234));
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(
        "<testsuite name=\"https://example.com/login\" tests=\"3\" failures=\"1\" time=\"1.234\">"
    ));
    assert!(xml.contains(
        "<testcase name=\"Login\" classname=\"element-discovery\" time=\"0.812\" />"
    ));
    assert!(xml.contains("<testcase name=\"Missing &lt;button&gt;\""));
    assert!(xml.contains("<failure message=\"ElementNotFound\" type=\"StepFailure\">"));
    assert!(xml.contains("screenshot: shots/error.png"));
    assert!(xml.trim_end().ends_with("</testsuite>"));
}

#[test]
fn junit_failure_kind_falls_back() {
    let mut result = failing_result("Crash");
    result.error = Some("Browser session I/O error: pipe closed".into());
    let xml = generate_junit_xml(&RunReport::from_results("u", vec![result]));
    assert!(xml.contains("message=\"execution error\""));
}

#[test]
fn xml_escaping() {
    assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
}

// ============================================================================
// 4. JSON shape
// ============================================================================

#[test]
fn report_serializes_camel_case() {
    let json = serde_json::to_value(mixed_report().with_duration(10)).unwrap();
    assert_eq!(json["durationMs"], 10);
    assert_eq!(json["results"][2]["status"], "fail");
    assert_eq!(json["results"][2]["stepsRun"], 1);
    assert_eq!(json["results"][0].get("error"), None);
}
