//! Structured observability hooks for report runs.
//!
//! One profile run emits a small, fixed set of lifecycle events: query
//! started, issues fetched, each issue evaluated, report written. Events
//! carry the profile id through a run-scoped span, so a JSON log stream can
//! be grouped per run without any parsing.

use tracing::info;

use crate::verdict::ReadinessVerdict;

/// RAII guard that enters a profile-scoped tracing span.
pub struct ProfileSpan {
    _span: tracing::span::EnteredSpan,
}

impl ProfileSpan {
    /// Create and enter a span tagged with the profile id.
    pub fn enter(profile: &str) -> Self {
        let span = tracing::info_span!("epicsheet.run", profile = %profile);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: the profile query is about to run.
pub fn emit_search_started(jql: &str) {
    info!(event = "search.started", jql = %jql);
}

/// Emit event: the tracker answered with this many issues.
pub fn emit_issues_found(count: usize) {
    info!(event = "search.finished", issues = count);
}

/// Emit event: the profile query failed (warning level).
pub fn emit_search_failed(jql: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "search.failed", jql = %jql, error = %error);
}

/// Emit event: one issue went through the check registry.
pub fn emit_issue_evaluated(key: &str, verdict: &ReadinessVerdict) {
    info!(
        event = "issue.evaluated",
        key = %key,
        ready = verdict.ready,
        severity = %verdict.severity,
        codes = verdict.codes.len(),
    );
}

/// Emit event: one report section was written.
pub fn emit_section_written(component: &str, rows: usize) {
    info!(event = "section.written", component = %component, rows = rows);
}

/// Emit event: the whole report is out.
pub fn emit_report_written(sections: usize, rows: usize) {
    info!(event = "report.written", sections = sections, rows = rows);
}
