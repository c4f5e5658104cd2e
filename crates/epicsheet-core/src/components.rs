//! Component grouping for the report.
//!
//! The report is laid out as one section per team component, in the order
//! the profile lists them, with a trailing section for issues that match no
//! configured component. An issue belongs to a component's section when the
//! component appears on the issue itself or on any of its children, so an
//! untagged epic still shows up where its stories are being delivered (and
//! the target-component check can then flag the missing tag).

use epicsheet_jira::issue::Issue;

/// Heading of the trailing section for unmatched issues.
pub const UNASSIGNED_HEADING: &str = "[UNASSIGNED]";

/// One report section: a component and the issues reported under it.
#[derive(Debug, Clone)]
pub struct ComponentBucket {
    pub name: String,
    pub issues: Vec<Issue>,
}

/// All sections of one report, plus the orphans.
#[derive(Debug, Clone)]
pub struct ComponentBuckets {
    /// In include-list order. An issue touching several components appears
    /// in each of their buckets.
    pub buckets: Vec<ComponentBucket>,
    pub orphans: Vec<Issue>,
}

impl ComponentBuckets {
    /// Distribute issues over the include list.
    pub fn partition(include: &[String], issues: Vec<Issue>) -> Self {
        let mut buckets: Vec<ComponentBucket> = include
            .iter()
            .map(|name| ComponentBucket {
                name: name.clone(),
                issues: Vec::new(),
            })
            .collect();
        let mut orphans = Vec::new();

        for issue in issues {
            let mut placed = false;
            for bucket in &mut buckets {
                if touches_component(&issue, &bucket.name) {
                    bucket.issues.push(issue.clone());
                    placed = true;
                }
            }
            if !placed {
                orphans.push(issue);
            }
        }

        ComponentBuckets { buckets, orphans }
    }
}

fn touches_component(issue: &Issue, component: &str) -> bool {
    issue.has_component(component)
        || issue.children.iter().any(|c| c.has_component(component))
}
