//! Console rendering of a report.

use probe_domain::{Report, ReportEntry};

const RULE: &str = "==================================================";
const SEPARATOR: &str = "--------------------------------------------------";

/// Renders the console summary.
///
/// ```text
/// Test 1: report_ok - PASS
/// Test 2: bad_json - FAIL
///
/// Overall: 1/2 tests passed
/// ```
///
/// With `verbose`, each case's status, response body and failure reason
/// are printed first.
#[must_use]
pub fn render_text(report: &Report, verbose: bool) -> String {
    let mut lines = Vec::new();

    if verbose {
        lines.push(format!("Testing {}", report.base_url()));
        lines.push(RULE.to_string());
        for entry in report.entries() {
            push_details(&mut lines, entry);
        }
        lines.push(String::new());
    }

    lines.push("Test Results Summary:".to_string());
    lines.push(RULE.to_string());
    for (index, entry) in report.entries().iter().enumerate() {
        let verdict = if entry.passed { "PASS" } else { "FAIL" };
        lines.push(format!("Test {}: {} - {verdict}", index + 1, entry.name));
    }
    lines.push(String::new());
    lines.push(format!(
        "Overall: {}/{} tests passed",
        report.passed(),
        report.total()
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_details(lines: &mut Vec<String>, entry: &ReportEntry) {
    let outcome = &entry.outcome;
    lines.push(format!("{}:", entry.name));

    match (&outcome.transport_error, outcome.status_code) {
        (Some(error), _) => lines.push(format!("Error: {}: {error}", error.title())),
        (None, Some(status)) => {
            lines.push(format!("Status Code: {status}"));
            lines.push(format!("Response: {}", outcome.raw_body));
        }
        (None, None) => lines.push("Status Code: none".to_string()),
    }
    if let Some(diagnostic) = &outcome.diagnostic {
        lines.push(format!("Reason: {diagnostic}"));
    }
    lines.push(format!("Time: {}ms", outcome.duration_ms));
    lines.push(SEPARATOR.to_string());
}
