//! epicsheet - delivery readiness reports for epics
//!
//! Runs a configured JQL profile against a Jira instance, evaluates every
//! returned epic with the readiness check registry, and prints one
//! tab-separated report to stdout, grouped into per-component sections and
//! ready to paste into a spreadsheet. Logs go to stderr.
//!
//! ```text
//! PASSWORD=... epicsheet -c epicsheet.yaml -p platform -u jdoe > report.tsv
//! ```

mod config;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use epicsheet_core::{
    evaluate, heading_row, obs, report_row, write_tsv_row, ComponentBuckets, Issue, IssueAnalysis,
    UNASSIGNED_HEADING,
};
use epicsheet_jira::{IssueSource, JiraClient};

use config::{Config, Profile};

#[derive(Parser)]
#[command(name = "epicsheet")]
#[command(author = "Epicsheet Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Delivery readiness reports for epics, straight from Jira", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Search profile id
    #[arg(short = 'p', long)]
    profile: String,

    /// Jira username
    #[arg(short = 'u', long)]
    username: String,

    /// Jira password, usually supplied through the environment
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    epicsheet_core::init_tracing(cli.json, level);

    let config = Config::load(&cli.config)?;
    let profile = config
        .find_profile(&cli.profile)
        .with_context(|| format!("profile '{}' not found", cli.profile))?;

    let client = JiraClient::connect(&config.instance.url, &cli.username, &cli.password)
        .await
        .with_context(|| format!("failed to connect to {}", config.instance.url))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_report(&client, profile, &mut out).await?;
    out.flush().context("failed to flush report")?;
    Ok(())
}

/// Fetch the profile's epics and write the grouped report.
async fn run_report<S, W>(source: &S, profile: &Profile, out: &mut W) -> Result<()>
where
    S: IssueSource,
    W: Write,
{
    let _span = obs::ProfileSpan::enter(&profile.id);

    obs::emit_search_started(&profile.jql);
    let issues = match source.find_epics(&profile.jql).await {
        Ok(issues) => issues,
        Err(error) => {
            obs::emit_search_failed(&profile.jql, &error);
            return Err(anyhow::Error::new(error).context("issue query failed"));
        }
    };
    obs::emit_issues_found(issues.len());

    let grouped = ComponentBuckets::partition(&profile.components.include, issues);

    let mut sections = 0;
    let mut rows = 0;
    for bucket in &grouped.buckets {
        if profile.components.exclude.iter().any(|c| c == &bucket.name) {
            continue;
        }
        write_tsv_row(out, &heading_row(&bucket.name))?;
        rows += write_issue_rows(out, Some(bucket.name.as_str()), &bucket.issues)?;
        sections += 1;
        obs::emit_section_written(&bucket.name, bucket.issues.len());
    }

    write_tsv_row(out, &[UNASSIGNED_HEADING.to_string()])?;
    rows += write_issue_rows(out, None, &grouped.orphans)?;

    obs::emit_report_written(sections + 1, rows);
    Ok(())
}

/// Evaluate and print one section's issues; the section component becomes
/// each issue's target component.
fn write_issue_rows<W: Write>(
    out: &mut W,
    component: Option<&str>,
    issues: &[Issue],
) -> Result<usize> {
    for issue in issues {
        let analysis = IssueAnalysis::of(issue, component);
        let verdict = evaluate(&analysis);
        obs::emit_issue_evaluated(&issue.key, &verdict);
        write_tsv_row(out, &report_row(issue, &analysis, &verdict))?;
    }
    Ok(issues.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentSelection;
    use epicsheet_core::IssueType;
    use epicsheet_jira::fakes::FakeIssueSource;

    fn profile(include: &[&str], exclude: &[&str]) -> Profile {
        Profile {
            id: "platform".to_string(),
            jql: "project = ABC AND type = Epic".to_string(),
            components: ComponentSelection {
                include: include.iter().map(|c| c.to_string()).collect(),
                exclude: exclude.iter().map(|c| c.to_string()).collect(),
            },
        }
    }

    fn epic(key: &str, components: &[&str]) -> Issue {
        let mut issue = Issue::new(key, IssueType::Epic, "In Progress");
        issue.link = format!("https://issues.example.com/browse/{key}");
        issue.summary = format!("Epic {key}");
        issue.components = components.iter().map(|c| c.to_string()).collect();
        issue
    }

    async fn render(source: &FakeIssueSource, profile: &Profile) -> String {
        let mut out = Vec::new();
        run_report(source, profile, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_report_groups_sections_and_orphans() {
        let source = FakeIssueSource::new(vec![
            epic("E-1", &["Installer"]),
            epic("E-2", &["Docs"]),
            epic("E-3", &["Telemetry"]),
        ]);
        let report = render(&source, &profile(&["Installer", "Docs"], &[])).await;
        let lines: Vec<&str> = report.lines().collect();

        // Section heading, one row, next heading, row, orphan heading, row.
        assert!(lines[0].starts_with("Installer\t"));
        assert!(lines[1].contains("E-1"));
        assert!(lines[2].starts_with("Docs\t"));
        assert!(lines[3].contains("E-2"));
        assert_eq!(lines[4], "[UNASSIGNED]");
        assert!(lines[5].contains("E-3"));
        assert_eq!(lines.len(), 6);

        assert_eq!(source.queries(), vec!["project = ABC AND type = Epic"]);
    }

    #[tokio::test]
    async fn test_excluded_sections_are_dropped() {
        let source = FakeIssueSource::new(vec![epic("E-1", &["Installer"]), epic("E-2", &["Docs"])]);
        let report = render(&source, &profile(&["Installer", "Docs"], &["Docs"])).await;

        assert!(report.contains("Installer\t"));
        assert!(!report.contains("Docs\t"));
        // The Docs epic still matched an excluded bucket, so it is not an
        // orphan and disappears with its section.
        assert!(!report.contains("E-2"));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let source = FakeIssueSource::failing("server unavailable");
        let mut out = Vec::new();
        let err = run_report(&source, &profile(&[], &[]), &mut out)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("server unavailable"));
    }

    #[tokio::test]
    async fn test_rows_carry_readiness_codes() {
        let source = FakeIssueSource::new(vec![epic("E-1", &["Installer"])]);
        let report = render(&source, &profile(&["Installer"], &[])).await;
        let row = report
            .lines()
            .find(|l| l.contains("E-1"))
            .expect("epic row");

        // A bare epic fails the delivery-data checks and is not ready.
        assert!(row.contains('✘'));
        assert!(row.contains("🔴"));
        assert!(row.contains("NODELIVERYOWNER"));
        assert!(row.contains("NOVERSION"));
    }
}
