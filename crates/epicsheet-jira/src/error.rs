//! Error types for the Jira boundary.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JiraError>;

#[derive(Debug, Error)]
pub enum JiraError {
    /// Transport-level failure: connect, timeout, TLS, body read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("jira returned {status} for {endpoint}: {body}")]
    Api {
        status: u16,
        endpoint: String,
        body: String,
    },

    /// The response decoded, but a field did not have the shape we expect.
    #[error("malformed jira payload: {0}")]
    Payload(String),
}

impl JiraError {
    pub fn payload(msg: impl Into<String>) -> Self {
        JiraError::Payload(msg.into())
    }
}
