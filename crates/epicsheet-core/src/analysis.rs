//! Analysis snapshot.
//!
//! [`IssueAnalysis`] is the read-only input the check registry runs over:
//! one flat struct per issue with every aggregate precomputed. Checks never
//! reach back into the tracker model, so all counting and scanning happens
//! here, once, in [`IssueAnalysis::of`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use epicsheet_jira::issue::{any_impediment, Comment, Issue, IssueType, PlanningFlags, StatusFamily};

use crate::severity::Severity;

/// Closed-vs-total progress over linked children, by issue count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuesCompletion {
    pub resolved: usize,
    pub total: usize,
}

/// Closed-vs-total progress by story points. `unknown` counts children
/// without an estimate; their points are absent from both sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointsCompletion {
    pub resolved: f64,
    pub total: f64,
    pub unknown: usize,
}

/// Per-child digest kept for component-filtered checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub key: String,
    pub status: StatusFamily,
    pub components: Vec<String>,
    pub impediment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueAnalysis {
    pub key: String,
    pub issue_type: IssueType,
    pub status: StatusFamily,
    pub prioritized: bool,
    pub fix_versions: Vec<String>,
    pub components: Vec<String>,
    pub has_parent_link: bool,
    /// Epic reference on stories. `Some("")` means a link field that is
    /// present but blank; checks treat both that and `None` as missing.
    pub epic_key: Option<String>,
    pub owner: String,
    pub qa_contact: String,
    pub planning: PlanningFlags,
    pub approved: bool,
    pub description: String,
    pub acceptance_criteria: String,
    pub design_doc: String,
    pub impediment: bool,
    pub any_linked_impediment: bool,
    pub issues_completion: IssuesCompletion,
    pub points_completion: PointsCompletion,
    /// Linked children carrying no component at all.
    pub children_missing_component: usize,
    /// Linked children of activity type (Story or Task).
    pub activities: usize,
    /// Loudest color declared by the newest status comment, NONE when the
    /// thread has no status comment.
    pub comment_status: Severity,
    pub comment_date: Option<DateTime<Utc>>,
    /// Component this issue is being reported under, when grouping applies.
    pub target_component: Option<String>,
    pub children: Vec<ChildSummary>,
}

impl IssueAnalysis {
    /// Blank snapshot for building fixtures; counts zero, texts empty.
    pub fn new(issue_type: IssueType, status: StatusFamily) -> Self {
        IssueAnalysis {
            key: String::new(),
            issue_type,
            status,
            prioritized: false,
            fix_versions: Vec::new(),
            components: Vec::new(),
            has_parent_link: false,
            epic_key: None,
            owner: String::new(),
            qa_contact: String::new(),
            planning: PlanningFlags::default(),
            approved: false,
            description: String::new(),
            acceptance_criteria: String::new(),
            design_doc: String::new(),
            impediment: false,
            any_linked_impediment: false,
            issues_completion: IssuesCompletion::default(),
            points_completion: PointsCompletion::default(),
            children_missing_component: 0,
            activities: 0,
            comment_status: Severity::None,
            comment_date: None,
            target_component: None,
            children: Vec::new(),
        }
    }

    /// Build the snapshot for one issue. Total: absent tracker fields become
    /// empty strings, `None`, or zero counts, never errors.
    pub fn of(issue: &Issue, target_component: Option<&str>) -> Self {
        let mut issues_completion = IssuesCompletion::default();
        let mut points_completion = PointsCompletion::default();
        let mut children_missing_component = 0;
        let mut activities = 0;

        for child in &issue.children {
            issues_completion.total += 1;
            let done = child.is_done();
            if done {
                issues_completion.resolved += 1;
            }
            match child.story_points {
                Some(points) => {
                    points_completion.total += points;
                    if done {
                        points_completion.resolved += points;
                    }
                }
                None => points_completion.unknown += 1,
            }
            if child.components.is_empty() {
                children_missing_component += 1;
            }
            if matches!(child.issue_type, IssueType::Story | IssueType::Task) {
                activities += 1;
            }
        }

        let (comment_status, comment_date) = comment_appraisal(&issue.comments);

        IssueAnalysis {
            key: issue.key.clone(),
            issue_type: issue.issue_type.clone(),
            status: issue.status_family(),
            prioritized: issue.is_prioritized(),
            fix_versions: issue.fix_versions.clone(),
            components: issue.components.clone(),
            has_parent_link: issue
                .parent_link
                .as_deref()
                .is_some_and(|link| !link.is_empty()),
            epic_key: issue.epic_link.clone(),
            owner: issue.owner.clone(),
            qa_contact: issue.qa_contact.clone(),
            planning: issue.planning_flags(),
            approved: issue.is_approved(),
            description: issue.description.clone(),
            acceptance_criteria: issue.acceptance_criteria.clone(),
            design_doc: issue.design_doc.clone(),
            impediment: issue.impediment,
            any_linked_impediment: any_impediment(&issue.children),
            issues_completion,
            points_completion,
            children_missing_component,
            activities,
            comment_status,
            comment_date,
            target_component: target_component.map(str::to_string),
            children: issue
                .children
                .iter()
                .map(|child| ChildSummary {
                    key: child.key.clone(),
                    status: child.status_family(),
                    components: child.components.clone(),
                    impediment: child.impediment,
                })
                .collect(),
        }
    }
}

/// Find the newest comment that declares a traffic-light color and return
/// its severity and timestamp.
fn comment_appraisal(comments: &[Comment]) -> (Severity, Option<DateTime<Utc>>) {
    let mut newest: Option<(DateTime<Utc>, Severity)> = None;
    for comment in comments {
        let Some(color) = declared_color(&comment.body) else {
            continue;
        };
        let newer = newest.is_none_or(|(seen, _)| comment.created > seen);
        if newer {
            newest = Some((comment.created, color));
        }
    }
    match newest {
        Some((created, color)) => (color, Some(created)),
        None => (Severity::None, None),
    }
}

/// A comment declares a color when its first line contains GREEN, YELLOW or
/// RED as a standalone word, case-insensitive. Several colors on one line
/// keep the loudest.
fn declared_color(body: &str) -> Option<Severity> {
    let first_line = body.lines().next().unwrap_or("");
    let mut found: Option<Severity> = None;
    for word in first_line.split(|ch: char| !ch.is_ascii_alphanumeric()) {
        let color = match word.to_ascii_lowercase().as_str() {
            "green" => Severity::Green,
            "yellow" => Severity::Yellow,
            "red" => Severity::Red,
            _ => continue,
        };
        found = Some(match found {
            Some(seen) => seen.raise(color),
            None => color,
        });
    }
    found
}
