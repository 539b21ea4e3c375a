use crate::report::report_model::RunReport;

// ============================================================================
// JUnit XML reporter — standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="https://example.com" tests="2" failures="1" time="1.234">
///   <testcase name="Login" classname="element-discovery" time="0.812" />
///   <testcase name="Search" classname="element-discovery" time="0.422">
///     <failure message="ElementNotFound" type="StepFailure">Step 0 ...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &RunReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let case_time = result.duration_ms as f64 / 1000.0;
        match &result.error {
            None => cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"element-discovery\" time=\"{:.3}\" />\n",
                escape_xml(&result.name),
                case_time
            )),
            Some(error) => {
                let mut body = error.clone();
                for shot in &result.screenshots {
                    body.push_str(&format!("\nscreenshot: {}", shot));
                }
                cases.push_str(&format!(
                    "  <testcase name=\"{name}\" classname=\"element-discovery\" time=\"{time:.3}\">\n    <failure message=\"{message}\" type=\"StepFailure\">{body}</failure>\n  </testcase>\n",
                    name = escape_xml(&result.name),
                    time = case_time,
                    message = escape_xml(failure_kind(error)),
                    body = escape_xml(&body),
                ));
            }
        }
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.url),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Taxonomy name embedded in an error string, for the failure message.
fn failure_kind(error: &str) -> &'static str {
    const KINDS: &[&str] = &[
        "NavigationFailure",
        "ElementNotFound",
        "UnknownAction",
        "ActionTimeout",
    ];
    KINDS
        .iter()
        .find(|k| error.contains(*k))
        .copied()
        .unwrap_or("execution error")
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
