use tracing::{debug, info, warn};

use crate::detect::arn::{resolve_assumed_role_arn, ASSUME_ROLE_EVENT};
use crate::detect::tracker::IdentityTracker;
use crate::detect::{AnalysisReport, Finding};
use crate::events::EventBatch;

/// Behavior switches for one analysis pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerOptions {
    /// Log every role-assumption event in full as it is processed.
    pub verbose_assume_role: bool,
}

/// Runs the detection pass over one batch of events.
///
/// Single-threaded and sequential: the pass sorts the batch (the barrier),
/// then walks it once. Each event goes through two independent checks
/// against the same tracker in the same iteration -- the role-assumption
/// update first, the known-address check second -- so a first use is never
/// flagged against its own record.
pub struct Analyzer {
    tracker: IdentityTracker,
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            tracker: IdentityTracker::new(),
            options,
        }
    }

    pub fn analyze(mut self, mut batch: EventBatch) -> AnalysisReport {
        info!(total = batch.len(), "analyzing events");
        batch.sort_by_time();

        let mut report = AnalysisReport {
            total: batch.len(),
            ..AnalysisReport::default()
        };

        for event in batch.events() {
            // Failed calls carry no trustworthy identity or address signal.
            if event.has_error() {
                report.skipped += 1;
                continue;
            }

            if event.name == ASSUME_ROLE_EVENT {
                if self.options.verbose_assume_role {
                    match event.to_json_string() {
                        Ok(json) => info!("{}", json),
                        Err(e) => warn!(event_id = %event.id, error = %e, "failed to render event"),
                    }
                }
                report.assume_role += 1;

                match resolve_assumed_role_arn(event) {
                    Ok(Some(canonical_arn)) => {
                        self.tracker.upsert(
                            &canonical_arn,
                            event.role_session_name(),
                            &event.source_ip_address,
                            event.time,
                        );
                    }
                    Ok(None) => {
                        warn!(
                            event_id = %event.id,
                            "role assumption with no resolvable identity, tracker not updated"
                        );
                        debug!(event = ?event, "unresolvable role-assumption event");
                    }
                    Err(e) => {
                        warn!(
                            event_id = %event.id,
                            error = %e,
                            "malformed role ARN, tracker not updated"
                        );
                    }
                }
            }

            // The check never mutates the tracker: a flagged address stays
            // untrusted until a later role-assumption happens to add it.
            if let Some(record) = self.tracker.lookup(event.actor_arn()) {
                if !record.known_addresses.contains(&event.source_ip_address) {
                    warn!(
                        arn = %record.canonical_arn,
                        known = ?record.known_addresses,
                        address = %event.source_ip_address,
                        user = %event.actor_user_name(),
                        agent = %event.user_agent,
                        "identity used from unknown source address"
                    );
                    report.suspicious += 1;
                    report.findings.push(Finding {
                        record: record.clone(),
                        event: event.clone(),
                    });
                }
            }
        }

        info!(
            total = report.total,
            skipped = report.skipped,
            assume_role = report.assume_role,
            suspicious = report.suspicious,
            "analysis complete"
        );
        report
    }
}
