//! Test double for [`IssueSource`].
//!
//! Serves a canned issue list and records every query it was asked to run.
//! Lives in the crate proper so downstream crates can drive their tests
//! with it.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::IssueSource;
use crate::error::{JiraError, Result};
use crate::issue::Issue;

#[derive(Default)]
pub struct FakeIssueSource {
    issues: Vec<Issue>,
    error: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeIssueSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        FakeIssueSource {
            issues,
            error: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A source whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        FakeIssueSource {
            issues: Vec::new(),
            error: Some(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries seen so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl IssueSource for FakeIssueSource {
    async fn find_epics(&self, jql: &str) -> Result<Vec<Issue>> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(jql.to_string());
        match &self.error {
            Some(message) => Err(JiraError::payload(message.clone())),
            None => Ok(self.issues.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueType;

    #[tokio::test]
    async fn test_serves_canned_issues_and_records_queries() {
        let fake = FakeIssueSource::new(vec![Issue::new("E-1", IssueType::Epic, "New")]);

        let found = fake.find_epics("project = E AND type = Epic").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "E-1");
        assert_eq!(fake.queries(), vec!["project = E AND type = Epic"]);
    }

    #[tokio::test]
    async fn test_failing_source_surfaces_the_message() {
        let fake = FakeIssueSource::failing("boom");
        let err = fake.find_epics("project = E").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
