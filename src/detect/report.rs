//! Analysis report formatting.

use crate::detect::{AnalysisReport, Finding};

/// Format the pass counters as a one-line human-readable summary.
pub fn format_summary(report: &AnalysisReport) -> String {
    format!(
        "analyzed {} events: {} skipped with error codes, {} AssumeRole, {} suspicious",
        report.total, report.skipped, report.assume_role, report.suspicious
    )
}

/// Format one finding as a report line.
pub fn format_finding(finding: &Finding) -> String {
    let mut known: Vec<&str> = finding
        .record
        .known_addresses
        .iter()
        .map(String::as_str)
        .collect();
    known.sort_unstable();

    format!(
        "{} given to [{}] used from '{}' user: '{}' agent: '{}'",
        finding.record.canonical_arn,
        known.join(", "),
        finding.event.source_ip_address,
        finding.event.actor_user_name(),
        finding.event.user_agent,
    )
}
