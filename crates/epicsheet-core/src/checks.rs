//! Readiness checks engine.
//!
//! Evaluates an [`IssueAnalysis`] snapshot against a [`CheckSet`] to produce
//! a [`ReadinessVerdict`], the ready/severity/codes triple one report row is
//! built from. Checks are independent predicates over the snapshot; each one
//! folds its effect into the verdict through the three monotonic mutators,
//! so registry order decides code order and nothing else.

use serde::{Deserialize, Serialize};

use epicsheet_jira::issue::{IssueType, StatusFamily};

use crate::analysis::IssueAnalysis;
use crate::severity::Severity;
use crate::verdict::{CheckCode, ReadinessVerdict};

// ---------------------------------------------------------------------------
// Check registry
// ---------------------------------------------------------------------------

/// A single readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessCheck {
    /// Fix version carried alongside another release.
    Alongside,
    /// At least one fix version is set.
    VersionPresence,
    /// More than one fix version is suspicious enough to call out.
    MultiVersion,
    /// Epics need child activities (stories or tasks).
    Activities,
    /// Description text present.
    Description,
    /// Epics need planning approval.
    Approvals,
    /// A delivery owner is assigned.
    DeliveryOwner,
    /// Waiver labels are surfaced as codes.
    PlanningFlags,
    /// A QA contact contradicts the no-QE waiver.
    QaContactMismatch,
    /// Without the waiver, a QA contact is required.
    QaContactMissing,
    /// Acceptance criteria text present.
    AcceptanceCriteria,
    /// A real priority is set.
    Priority,
    /// Work has started.
    Started,
    /// Every child carries a point estimate.
    StoryPoints,
    /// Neither the issue nor any child is flagged as impeded.
    Impediment,
    /// Epics roll up to a feature or initiative.
    InitiativeLink,
    /// Every child carries a component.
    LinkedIssueComponent,
    /// The issue carries the component it is reported under.
    TargetComponent,
    /// Done issues have fully resolved children and points.
    DoneConsistency,
    /// A traffic-light status comment exists; its color is adopted.
    StatusComment,
    /// Stories belong to an epic.
    LinkedEpic,
    /// Active epics have children actually moving.
    ActiveChildStories,
    /// Without the no-feature waiver, a design reference is required.
    DesignDoc,
}

/// Every check, in evaluation order. Order decides only the sequence of
/// recorded codes; ready and severity land the same under any permutation.
pub const STANDARD_CHECKS: [ReadinessCheck; 23] = [
    ReadinessCheck::Alongside,
    ReadinessCheck::VersionPresence,
    ReadinessCheck::MultiVersion,
    ReadinessCheck::Activities,
    ReadinessCheck::Description,
    ReadinessCheck::Approvals,
    ReadinessCheck::DeliveryOwner,
    ReadinessCheck::PlanningFlags,
    ReadinessCheck::QaContactMismatch,
    ReadinessCheck::QaContactMissing,
    ReadinessCheck::AcceptanceCriteria,
    ReadinessCheck::Priority,
    ReadinessCheck::Started,
    ReadinessCheck::StoryPoints,
    ReadinessCheck::Impediment,
    ReadinessCheck::InitiativeLink,
    ReadinessCheck::LinkedIssueComponent,
    ReadinessCheck::TargetComponent,
    ReadinessCheck::DoneConsistency,
    ReadinessCheck::StatusComment,
    ReadinessCheck::LinkedEpic,
    ReadinessCheck::ActiveChildStories,
    ReadinessCheck::DesignDoc,
];

/// An ordered set of checks to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSet {
    pub checks: Vec<ReadinessCheck>,
}

impl CheckSet {
    /// The full standard registry in canonical order.
    pub fn standard() -> Self {
        Self {
            checks: STANDARD_CHECKS.to_vec(),
        }
    }

    pub fn new(checks: Vec<ReadinessCheck>) -> Self {
        Self { checks }
    }

    /// Append a check.
    pub fn with_check(mut self, check: ReadinessCheck) -> Self {
        self.checks.push(check);
        self
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate one snapshot against the standard registry.
pub fn evaluate(analysis: &IssueAnalysis) -> ReadinessVerdict {
    evaluate_with(&CheckSet::standard(), analysis)
}

/// Evaluate one snapshot against an explicit [`CheckSet`].
///
/// Obsolete issues short-circuit: only the OBSOLETE code is recorded and the
/// registry is skipped, leaving the verdict otherwise pristine.
pub fn evaluate_with(check_set: &CheckSet, analysis: &IssueAnalysis) -> ReadinessVerdict {
    let mut verdict = ReadinessVerdict::new();
    if analysis.status == StatusFamily::Obsolete {
        verdict.push_code(CheckCode::Obsolete);
        return verdict;
    }
    for check in &check_set.checks {
        apply_check(*check, analysis, &mut verdict);
    }
    verdict
}

fn apply_check(check: ReadinessCheck, a: &IssueAnalysis, verdict: &mut ReadinessVerdict) {
    match check {
        ReadinessCheck::Alongside => {
            if a.fix_versions.iter().any(|v| v.starts_with("Alongside")) {
                verdict.push_code(CheckCode::Alongside);
            }
        }
        ReadinessCheck::VersionPresence => {
            if a.fix_versions.is_empty() {
                verdict.mark_not_ready().push_code(CheckCode::NoVersion);
            }
        }
        ReadinessCheck::MultiVersion => {
            if a.fix_versions.len() > 1 {
                verdict.push_code(CheckCode::MultiVersion);
            }
        }
        ReadinessCheck::Activities => {
            if a.issue_type == IssueType::Epic && a.activities == 0 {
                verdict.mark_not_ready().push_code(CheckCode::NoStories);
            }
        }
        ReadinessCheck::Description => {
            if a.description.is_empty() {
                verdict.mark_not_ready().push_code(CheckCode::NoDescription);
            }
        }
        ReadinessCheck::Approvals => {
            if a.issue_type == IssueType::Epic && !a.approved {
                verdict.mark_not_ready().push_code(CheckCode::NoAcks);
            }
        }
        ReadinessCheck::DeliveryOwner => {
            if a.owner.is_empty() {
                verdict
                    .mark_not_ready()
                    .raise_severity(Severity::Red)
                    .push_code(CheckCode::NoDeliveryOwner);
            }
        }
        ReadinessCheck::PlanningFlags => {
            if a.planning.no_qe {
                verdict.push_code(CheckCode::NoQe);
            }
            if a.planning.no_feature {
                verdict.push_code(CheckCode::NoFeature);
            }
            if a.planning.no_doc {
                verdict.push_code(CheckCode::NoDoc);
            }
        }
        ReadinessCheck::QaContactMismatch => {
            if a.planning.no_qe && !a.qa_contact.is_empty() {
                verdict.mark_not_ready().push_code(CheckCode::NoQeMismatch);
            }
        }
        ReadinessCheck::QaContactMissing => {
            if !a.planning.no_qe && a.qa_contact.is_empty() {
                verdict
                    .mark_not_ready()
                    .raise_severity(Severity::Red)
                    .push_code(CheckCode::NoQaContact);
            }
        }
        ReadinessCheck::AcceptanceCriteria => {
            if a.acceptance_criteria.is_empty() {
                verdict
                    .mark_not_ready()
                    .raise_severity(Severity::Red)
                    .push_code(CheckCode::NoCriteria);
            }
        }
        ReadinessCheck::Priority => {
            if !a.prioritized {
                verdict
                    .mark_not_ready()
                    .raise_severity(Severity::Red)
                    .push_code(CheckCode::NoPriority);
            }
        }
        ReadinessCheck::Started => {
            if a.status != StatusFamily::Active && a.status != StatusFamily::Done {
                verdict
                    .raise_severity(Severity::Yellow)
                    .push_code(CheckCode::NotStarted);
            }
        }
        ReadinessCheck::StoryPoints => {
            if a.points_completion.unknown > 0 {
                verdict.push_code(CheckCode::NoStoryPoints);
            }
        }
        ReadinessCheck::Impediment => {
            if a.impediment || a.any_linked_impediment {
                verdict
                    .raise_severity(Severity::Red)
                    .push_code(CheckCode::Impediment);
            }
        }
        ReadinessCheck::InitiativeLink => {
            if a.issue_type == IssueType::Epic && !a.has_parent_link {
                verdict.mark_not_ready().push_code(CheckCode::NoInitiative);
            }
        }
        ReadinessCheck::LinkedIssueComponent => {
            if a.children_missing_component > 0 {
                verdict
                    .mark_not_ready()
                    .push_code(CheckCode::IssueNoComponent);
            }
        }
        ReadinessCheck::TargetComponent => {
            if let Some(target) = &a.target_component {
                if !a.components.iter().any(|c| c == target) {
                    verdict
                        .mark_not_ready()
                        .raise_severity(Severity::Yellow)
                        .push_code(CheckCode::NoComponent);
                }
            }
        }
        ReadinessCheck::DoneConsistency => {
            if a.status == StatusFamily::Done {
                let issues_done = a.issues_completion.resolved == a.issues_completion.total;
                // Exact compare: both sums fold over the same estimates.
                let points_done = a.points_completion.resolved == a.points_completion.total;
                if issues_done && points_done {
                    verdict.raise_severity(Severity::Green);
                } else {
                    verdict
                        .raise_severity(Severity::Red)
                        .push_code(CheckCode::NotDone);
                }
            }
        }
        ReadinessCheck::StatusComment => {
            if a.comment_status == Severity::None {
                verdict.push_code(CheckCode::NoStatusComment);
            } else {
                verdict.raise_severity(a.comment_status);
            }
        }
        ReadinessCheck::LinkedEpic => {
            if a.issue_type == IssueType::Story && a.epic_key.as_deref().is_none_or(str::is_empty)
            {
                verdict.mark_not_ready().push_code(CheckCode::NoEpic);
            }
        }
        ReadinessCheck::ActiveChildStories => {
            if a.issue_type == IssueType::Epic && a.status == StatusFamily::Active {
                let moving = a
                    .children
                    .iter()
                    .filter(|c| match &a.target_component {
                        Some(target) => c.components.iter().any(|n| n == target),
                        None => true,
                    })
                    .any(|c| matches!(c.status, StatusFamily::Active | StatusFamily::Done));
                if !moving {
                    verdict
                        .raise_severity(Severity::Red)
                        .push_code(CheckCode::NoActiveStories);
                }
            }
        }
        ReadinessCheck::DesignDoc => {
            if !a.planning.no_feature && a.design_doc.is_empty() {
                verdict.mark_not_ready().push_code(CheckCode::NoDesign);
            }
        }
    }
}
