//! Epicsheet Core Library
//!
//! The readiness engine and report renderer: snapshot building, the check
//! registry, component grouping and sheet-ready output, re-exported for
//! programmatic use.

pub mod analysis;
pub mod checks;
pub mod components;
pub mod obs;
pub mod severity;
pub mod sheet;
pub mod telemetry;
pub mod verdict;

pub use analysis::{ChildSummary, IssueAnalysis, IssuesCompletion, PointsCompletion};
pub use checks::{evaluate, evaluate_with, CheckSet, ReadinessCheck, STANDARD_CHECKS};
pub use components::{ComponentBucket, ComponentBuckets, UNASSIGNED_HEADING};
pub use severity::Severity;
pub use sheet::{heading_row, report_row, write_tsv_row, REPORT_COLUMNS};
pub use verdict::{CheckCode, ReadinessVerdict};

pub use obs::{
    emit_issue_evaluated, emit_issues_found, emit_report_written, emit_search_failed,
    emit_search_started, emit_section_written, ProfileSpan,
};
pub use telemetry::init_tracing;

pub use epicsheet_jira::issue::{Issue, IssueType, StatusFamily};

/// Version of the epicsheet core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
