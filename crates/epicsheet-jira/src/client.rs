//! Jira REST client.
//!
//! Talks to the v2 API with basic auth. Search results are paginated by the
//! server; [`JiraClient::search`] walks every page and hands back fully
//! normalized issues. [`JiraClient::find_epics`] additionally resolves the
//! children of each epic through the epic link field, a handful of queries
//! at a time.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{JiraError, Result};
use crate::fields;
use crate::issue::{Issue, IssueType, SearchPage};

/// Issues requested per search page.
const SEARCH_PAGE_SIZE: usize = 50;
/// Epic-children queries kept in flight at once.
const CHILD_FETCH_CONCURRENCY: usize = 8;
/// Per-request deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can answer an epic query. The real implementation is
/// [`JiraClient`]; tests use [`crate::fakes::FakeIssueSource`].
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Run a JQL query and return the matching issues, with the children of
    /// every epic already attached.
    async fn find_epics(&self, jql: &str) -> Result<Vec<Issue>>;
}

pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    /// Build a client and verify the credentials with a `myself` probe, so
    /// auth problems surface before the first real query.
    pub async fn connect(base_url: &str, username: &str, password: &str) -> Result<JiraClient> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("epicsheet/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let client = JiraClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };

        let endpoint = format!("{}/rest/api/2/myself", client.base_url);
        let response = client
            .http
            .get(&endpoint)
            .basic_auth(&client.username, Some(&client.password))
            .send()
            .await?;
        let _: Value = decode(response, &endpoint).await?;
        info!(url = %client.base_url, user = %client.username, "authenticated against jira");
        Ok(client)
    }

    /// Run a JQL query, walking every result page.
    pub async fn search(&self, jql: &str) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut start_at = 0;
        loop {
            let page = self.search_page(jql, start_at).await?;
            let fetched = page.issues.len();
            let total = page.total;
            let page_start = page.start_at;
            for raw in page.issues {
                issues.push(Issue::from_raw(raw, &self.base_url)?);
            }
            match next_start(page_start, fetched, total) {
                Some(next) => start_at = next,
                None => break,
            }
        }
        debug!(jql, count = issues.len(), "search finished");
        Ok(issues)
    }

    /// Run a JQL query and resolve the children of every epic in the result.
    pub async fn find_epics(&self, jql: &str) -> Result<Vec<Issue>> {
        let mut issues = self.search(jql).await?;

        let epic_keys: Vec<String> = issues
            .iter()
            .filter(|i| i.is_type(&IssueType::Epic))
            .map(|i| i.key.clone())
            .collect();
        debug!(epics = epic_keys.len(), "resolving epic children");

        let fetched: Vec<(String, Vec<Issue>)> = stream::iter(epic_keys)
            .map(|key| async move {
                let children = self.search(&children_jql(&key)).await?;
                Ok::<_, JiraError>((key, children))
            })
            .buffer_unordered(CHILD_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mut by_epic: HashMap<String, Vec<Issue>> = fetched.into_iter().collect();
        for issue in issues.iter_mut() {
            if issue.is_type(&IssueType::Epic) {
                issue.children = by_epic.remove(&issue.key).unwrap_or_default();
            }
        }
        Ok(issues)
    }

    async fn search_page(&self, jql: &str, start_at: usize) -> Result<SearchPage> {
        let endpoint = format!("{}/rest/api/2/search", self.base_url);
        let body = json!({
            "jql": jql,
            "startAt": start_at,
            "maxResults": SEARCH_PAGE_SIZE,
            "fields": requested_fields(),
        });
        debug!(jql, start_at, "fetching search page");
        let response = self
            .http
            .post(&endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;
        decode(response, &endpoint).await
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn find_epics(&self, jql: &str) -> Result<Vec<Issue>> {
        JiraClient::find_epics(self, jql).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, endpoint: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(JiraError::Api {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            body,
        });
    }
    Ok(response.json().await?)
}

/// Field list sent with every search, standard fields plus the custom ids
/// from [`fields`].
fn requested_fields() -> Vec<&'static str> {
    let mut list = vec![
        "summary",
        "description",
        "issuetype",
        "status",
        "priority",
        "fixVersions",
        "components",
        "labels",
        "comment",
    ];
    list.extend_from_slice(fields::REQUESTED);
    list
}

fn children_jql(epic_key: &str) -> String {
    format!("\"Epic Link\" = {epic_key} ORDER BY key ASC")
}

/// Offset of the next page, or `None` once the server has delivered
/// everything. An empty page also stops the walk, whatever `total` claims.
fn next_start(page_start: usize, fetched: usize, total: usize) -> Option<usize> {
    let consumed = page_start + fetched;
    if fetched == 0 || consumed >= total {
        None
    } else {
        Some(consumed)
    }
}
