//! Issue model.
//!
//! A deliberately flat view of a Jira issue: only the fields the readiness
//! report consumes, normalized at the boundary so the rest of the program
//! never touches raw REST payloads. Children fetched through the epic link
//! hang off their epic as plain owned values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{JiraError, Result};
use crate::fields;

/// Label that waives QE involvement for an epic.
pub const LABEL_NO_QE: &str = "no-qe";
/// Label that waives the feature-gate requirement.
pub const LABEL_NO_FEATURE: &str = "no-feature";
/// Label that waives documentation work.
pub const LABEL_NO_DOC: &str = "no-doc";
/// Label set once planning review has signed the epic off.
pub const LABEL_APPROVED: &str = "approved";

/// Issue type, folded to the handful of kinds the report distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    Epic,
    Story,
    Task,
    Bug,
    /// Anything else, carrying the server-side name verbatim.
    Other(String),
}

impl IssueType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "epic" => IssueType::Epic,
            "story" => IssueType::Story,
            "task" => IssueType::Task,
            "bug" => IssueType::Bug,
            _ => IssueType::Other(name.to_string()),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::Epic => write!(f, "Epic"),
            IssueType::Story => write!(f, "Story"),
            IssueType::Task => write!(f, "Task"),
            IssueType::Bug => write!(f, "Bug"),
            IssueType::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Workflow family a status name belongs to.
///
/// Jira workflows vary per project; the report only cares about four broad
/// phases, so unknown status names conservatively count as not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFamily {
    Todo,
    Active,
    Done,
    Obsolete,
}

impl StatusFamily {
    pub fn of(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "in progress" | "code review" | "review" | "on_qa" | "on qa" | "verified" => {
                StatusFamily::Active
            }
            "done" | "closed" | "resolved" => StatusFamily::Done,
            "obsolete" | "won't do" | "wont do" => StatusFamily::Obsolete,
            _ => StatusFamily::Todo,
        }
    }
}

impl fmt::Display for StatusFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFamily::Todo => "To Do",
            StatusFamily::Active => "Active",
            StatusFamily::Done => "Done",
            StatusFamily::Obsolete => "Obsolete",
        };
        write!(f, "{name}")
    }
}

/// Planning waivers derived from labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningFlags {
    pub no_qe: bool,
    pub no_feature: bool,
    pub no_doc: bool,
}

/// One comment, newest-last as Jira returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub created: DateTime<Utc>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    /// Browse URL on the configured instance.
    pub link: String,
    pub summary: String,
    pub issue_type: IssueType,
    /// Raw workflow status name, shown verbatim in the report.
    pub status: String,
    /// Priority name, `None` when the field is unset.
    pub priority: Option<String>,
    pub fix_versions: Vec<String>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
    pub description: String,
    pub acceptance_criteria: String,
    pub design_doc: String,
    /// Delivery owner display name, empty when unassigned.
    pub owner: String,
    /// QA contact display name, empty when unassigned.
    pub qa_contact: String,
    /// Key of the epic a story belongs to.
    pub epic_link: Option<String>,
    /// Key of the feature or initiative an epic rolls up to.
    pub parent_link: Option<String>,
    pub story_points: Option<f64>,
    /// True when the Flagged field carries the Impediment option.
    pub impediment: bool,
    pub comments: Vec<Comment>,
    /// Issues linked to this epic through the epic link field.
    pub children: Vec<Issue>,
}

impl Issue {
    /// Bare issue for building fixtures; every optional field starts empty.
    pub fn new(key: &str, issue_type: IssueType, status: &str) -> Self {
        Issue {
            key: key.to_string(),
            link: String::new(),
            summary: String::new(),
            issue_type,
            status: status.to_string(),
            priority: None,
            fix_versions: Vec::new(),
            components: Vec::new(),
            labels: Vec::new(),
            description: String::new(),
            acceptance_criteria: String::new(),
            design_doc: String::new(),
            owner: String::new(),
            qa_contact: String::new(),
            epic_link: None,
            parent_link: None,
            story_points: None,
            impediment: false,
            comments: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_type(&self, kind: &IssueType) -> bool {
        self.issue_type == *kind
    }

    pub fn status_family(&self) -> StatusFamily {
        StatusFamily::of(&self.status)
    }

    pub fn is_done(&self) -> bool {
        self.status_family() == StatusFamily::Done
    }

    pub fn is_obsolete(&self) -> bool {
        self.status_family() == StatusFamily::Obsolete
    }

    /// Whether a real priority is set. Jira models "no decision yet" both as
    /// an absent field and as the literal Undefined priority.
    pub fn is_prioritized(&self) -> bool {
        self.priority
            .as_deref()
            .is_some_and(|p| !p.eq_ignore_ascii_case("undefined"))
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn has_component(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }

    pub fn planning_flags(&self) -> PlanningFlags {
        PlanningFlags {
            no_qe: self.has_label(LABEL_NO_QE),
            no_feature: self.has_label(LABEL_NO_FEATURE),
            no_doc: self.has_label(LABEL_NO_DOC),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.has_label(LABEL_APPROVED)
    }

    /// Decode one issue out of a search payload.
    pub(crate) fn from_raw(raw: RawIssue, browse_base: &str) -> Result<Issue> {
        let f = raw.fields;
        let comments = match f.comment {
            Some(block) => block
                .comments
                .into_iter()
                .map(|c| {
                    Ok(Comment {
                        author: c.author.map(|a| a.display()).unwrap_or_default(),
                        created: parse_jira_time(&c.created)?,
                        body: c.body,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let issue_type = f
            .issuetype
            .as_ref()
            .map(|t| IssueType::from_name(&t.name))
            .ok_or_else(|| JiraError::payload(format!("{}: missing issuetype", raw.key)))?;
        let status = f
            .status
            .as_ref()
            .map(|s| s.name.clone())
            .ok_or_else(|| JiraError::payload(format!("{}: missing status", raw.key)))?;

        Ok(Issue {
            link: format!("{}/browse/{}", browse_base.trim_end_matches('/'), raw.key),
            summary: f.summary.unwrap_or_default(),
            issue_type,
            status,
            priority: f.priority.map(|p| p.name),
            fix_versions: f.fix_versions.into_iter().map(|v| v.name).collect(),
            components: f.components.into_iter().map(|c| c.name).collect(),
            labels: f.labels,
            description: f.description.unwrap_or_default(),
            acceptance_criteria: fields::string_field(&f.custom, fields::CF_ACCEPTANCE_CRITERIA)
                .unwrap_or_default(),
            design_doc: fields::string_field(&f.custom, fields::CF_DESIGN_DOC).unwrap_or_default(),
            owner: fields::user_field(&f.custom, fields::CF_OWNER).unwrap_or_default(),
            qa_contact: fields::user_field(&f.custom, fields::CF_QA_CONTACT).unwrap_or_default(),
            epic_link: fields::string_field(&f.custom, fields::CF_EPIC_LINK),
            parent_link: fields::string_field(&f.custom, fields::CF_PARENT_LINK),
            story_points: fields::number_field(&f.custom, fields::CF_STORY_POINTS),
            impediment: fields::is_flagged(&f.custom),
            comments,
            children: Vec::new(),
            key: raw.key,
        })
    }
}

/// Whether any issue in the slice is flagged as impeded.
pub fn any_impediment(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.impediment)
}

/// Jira timestamps come as `2024-03-01T12:34:56.000+0000`; accept plain
/// RFC 3339 as well since some proxies rewrite the offset.
fn parse_jira_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| JiraError::payload(format!("bad timestamp {raw:?}: {e}")))
}

// ---- raw REST payloads ----

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(rename = "startAt")]
    pub start_at: usize,
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    pub key: String,
    pub fields: RawFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub issuetype: Option<NamedField>,
    pub status: Option<NamedField>,
    pub priority: Option<NamedField>,
    #[serde(rename = "fixVersions", default)]
    pub fix_versions: Vec<NamedField>,
    #[serde(default)]
    pub components: Vec<NamedField>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub comment: Option<RawCommentBlock>,
    /// Everything else, notably the `customfield_*` entries.
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCommentBlock {
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub author: Option<RawUser>,
    pub created: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

impl RawUser {
    fn display(self) -> String {
        self.display_name
            .filter(|n| !n.is_empty())
            .or(self.name)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn decode(value: Value) -> Issue {
        let raw: RawIssue = serde_json::from_value(value).expect("raw issue");
        Issue::from_raw(raw, "https://issues.example.com/").expect("typed issue")
    }

    #[test]
    fn test_status_families_cover_common_workflow_names() {
        assert_eq!(StatusFamily::of("New"), StatusFamily::Todo);
        assert_eq!(StatusFamily::of("Backlog"), StatusFamily::Todo);
        assert_eq!(StatusFamily::of("In Progress"), StatusFamily::Active);
        assert_eq!(StatusFamily::of("ON_QA"), StatusFamily::Active);
        assert_eq!(StatusFamily::of("Code Review"), StatusFamily::Active);
        assert_eq!(StatusFamily::of("Closed"), StatusFamily::Done);
        assert_eq!(StatusFamily::of("Resolved"), StatusFamily::Done);
        assert_eq!(StatusFamily::of("Obsolete"), StatusFamily::Obsolete);
        assert_eq!(StatusFamily::of("Won't Do"), StatusFamily::Obsolete);
    }

    #[test]
    fn test_issue_type_folds_unknown_names_verbatim() {
        assert_eq!(IssueType::from_name("EPIC"), IssueType::Epic);
        assert_eq!(IssueType::from_name("story"), IssueType::Story);
        let other = IssueType::from_name("Sub-task");
        assert_eq!(other, IssueType::Other("Sub-task".to_string()));
        assert_eq!(other.to_string(), "Sub-task");
    }

    #[test]
    fn test_prioritized_excludes_the_undefined_placeholder() {
        let mut issue = Issue::new("X-1", IssueType::Epic, "New");
        assert!(!issue.is_prioritized());
        issue.priority = Some("Undefined".to_string());
        assert!(!issue.is_prioritized());
        issue.priority = Some("Critical".to_string());
        assert!(issue.is_prioritized());
    }

    #[test]
    fn test_planning_flags_come_from_labels() {
        let mut issue = Issue::new("X-1", IssueType::Epic, "New");
        issue.labels = vec!["no-qe".to_string(), "no-doc".to_string()];
        let flags = issue.planning_flags();
        assert!(flags.no_qe);
        assert!(!flags.no_feature);
        assert!(flags.no_doc);
        assert!(!issue.is_approved());

        issue.labels.push("approved".to_string());
        assert!(issue.is_approved());
    }

    #[test]
    fn test_from_raw_normalizes_a_full_payload() {
        let issue = decode(json!({
            "key": "PROJ-100",
            "fields": {
                "summary": "Ship the installer rework",
                "description": "Long form text",
                "issuetype": { "name": "Epic" },
                "status": { "name": "In Progress" },
                "priority": { "name": "Major" },
                "fixVersions": [ { "name": "v4.16" } ],
                "components": [ { "name": "Installer" }, { "name": "Docs" } ],
                "labels": ["approved"],
                "comment": { "comments": [ {
                    "author": { "name": "jdoe", "displayName": "Jane Doe" },
                    "created": "2024-03-01T12:34:56.000+0000",
                    "body": "YELLOW\nwaiting on capacity"
                } ] },
                "customfield_12315542": { "displayName": "Jane Doe" },
                "customfield_12315948": { "displayName": "Quinn Assur" },
                "customfield_12310243": 8,
                "customfield_12313140": "STRAT-7",
                "customfield_12315640": [ { "value": "Impediment" } ]
            }
        }));

        assert_eq!(issue.key, "PROJ-100");
        assert_eq!(issue.link, "https://issues.example.com/browse/PROJ-100");
        assert_eq!(issue.issue_type, IssueType::Epic);
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.fix_versions, vec!["v4.16".to_string()]);
        assert_eq!(issue.components.len(), 2);
        assert_eq!(issue.owner, "Jane Doe");
        assert_eq!(issue.qa_contact, "Quinn Assur");
        assert_eq!(issue.story_points, Some(8.0));
        assert_eq!(issue.parent_link.as_deref(), Some("STRAT-7"));
        assert_eq!(issue.epic_link, None);
        assert!(issue.impediment);
        assert!(issue.is_approved());
        assert_eq!(issue.comments.len(), 1);
        assert_eq!(issue.comments[0].author, "Jane Doe");
        assert_eq!(
            issue.comments[0].created,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap()
        );
    }

    #[test]
    fn test_from_raw_tolerates_sparse_fields() {
        let issue = decode(json!({
            "key": "PROJ-101",
            "fields": {
                "issuetype": { "name": "Story" },
                "status": { "name": "New" }
            }
        }));

        assert_eq!(issue.summary, "");
        assert_eq!(issue.priority, None);
        assert!(issue.fix_versions.is_empty());
        assert!(issue.comments.is_empty());
        assert!(!issue.impediment);
        assert_eq!(issue.story_points, None);
    }

    #[test]
    fn test_from_raw_rejects_a_missing_status() {
        let raw: RawIssue = serde_json::from_value(json!({
            "key": "PROJ-102",
            "fields": { "issuetype": { "name": "Epic" } }
        }))
        .expect("raw issue");
        let err = Issue::from_raw(raw, "https://issues.example.com").unwrap_err();
        assert!(err.to_string().contains("missing status"));
    }

    #[test]
    fn test_any_impediment_scans_a_slice() {
        let clear = Issue::new("A-1", IssueType::Story, "New");
        let mut flagged = Issue::new("A-2", IssueType::Story, "New");
        flagged.impediment = true;

        assert!(!any_impediment(&[clear.clone()]));
        assert!(any_impediment(&[clear, flagged]));
    }
}
