//! Jira boundary for epicsheet.
//!
//! Everything that knows about the tracker lives here: the flat [`Issue`]
//! model, the status and type folds, the custom field mapping, and the REST
//! client that pages through search results and resolves epic children.
//! Downstream code consumes [`IssueSource`] so reports can be driven by the
//! real server or by [`fakes::FakeIssueSource`].

pub mod client;
pub mod error;
pub mod fakes;
pub mod fields;
pub mod issue;

pub use client::{IssueSource, JiraClient};
pub use error::{JiraError, Result};
pub use issue::{any_impediment, Comment, Issue, IssueType, PlanningFlags, StatusFamily};
