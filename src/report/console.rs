use crate::report::report_model::RunReport;

// ============================================================================
// Console reporter — formatted terminal output
// ============================================================================

/// Format a run report for terminal output.
///
/// Produces output like:
/// ```text
/// === Run: https://example.com/login ===
///
/// ✓ PASS  Login happy path (3/3 steps, 2 screenshots)
/// ✗ FAIL  Missing field (1/2 steps, 2 screenshots)
///     [ERROR] Step 0 (click 'e99') failed while locating: ElementNotFound: ...
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Run: {} ===\n\n", report.url));

    for result in &report.results {
        let marker = if result.passed() {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!(
            "{}  {} ({}/{} steps, {} screenshots)\n",
            marker,
            result.name,
            result.steps_run,
            result.steps.len(),
            result.screenshots.len()
        ));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }
        if !result.passed() {
            for shot in &result.screenshots {
                out.push_str(&format!("    [SHOT] {}\n", shot));
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}
