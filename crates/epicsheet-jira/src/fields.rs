//! Custom field mapping.
//!
//! Jira exposes instance-specific fields under opaque `customfield_*` ids.
//! Every id the report depends on is named here, next to a small set of
//! shape-tolerant extractors, so a schema change on the server side is a
//! one-file fix.

use serde_json::{Map, Value};

/// Delivery owner, a user picker.
pub const CF_OWNER: &str = "customfield_12315542";
/// QA contact, a user picker.
pub const CF_QA_CONTACT: &str = "customfield_12315948";
/// Story point estimate, a number.
pub const CF_STORY_POINTS: &str = "customfield_12310243";
/// Epic link, the key of the parent epic on stories.
pub const CF_EPIC_LINK: &str = "customfield_12311140";
/// Parent link, the key of the enclosing feature or initiative on epics.
pub const CF_PARENT_LINK: &str = "customfield_12313140";
/// Acceptance criteria, free text.
pub const CF_ACCEPTANCE_CRITERIA: &str = "customfield_12315940";
/// Design doc reference, free text.
pub const CF_DESIGN_DOC: &str = "customfield_12316242";
/// Flagged, a checkbox list whose only stock option is "Impediment".
pub const CF_FLAGGED: &str = "customfield_12315640";

/// All custom fields the search endpoint is asked to return.
pub const REQUESTED: &[&str] = &[
    CF_OWNER,
    CF_QA_CONTACT,
    CF_STORY_POINTS,
    CF_EPIC_LINK,
    CF_PARENT_LINK,
    CF_ACCEPTANCE_CRITERIA,
    CF_DESIGN_DOC,
    CF_FLAGGED,
];

/// Plain string field. Absent, null or non-string values read as `None`.
pub fn string_field(fields: &Map<String, Value>, id: &str) -> Option<String> {
    match fields.get(id) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// User picker field. Prefers the display name, falls back to the login.
pub fn user_field(fields: &Map<String, Value>, id: &str) -> Option<String> {
    let user = fields.get(id)?.as_object()?;
    for key in ["displayName", "name"] {
        if let Some(Value::String(s)) = user.get(key) {
            if !s.is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

/// Numeric field. Jira delivers story points as a JSON number.
pub fn number_field(fields: &Map<String, Value>, id: &str) -> Option<f64> {
    fields.get(id)?.as_f64()
}

/// Whether the Flagged field carries the Impediment option.
pub fn is_flagged(fields: &Map<String, Value>) -> bool {
    let Some(Value::Array(options)) = fields.get(CF_FLAGGED) else {
        return false;
    };
    options.iter().any(|opt| {
        opt.get("value")
            .and_then(Value::as_str)
            .is_some_and(|v| v.eq_ignore_ascii_case("impediment"))
    })
}
