//! Report rendering.
//!
//! Turns issue, snapshot and verdict into one row of Google-Sheets-ready
//! cells, and writes rows out as tab-separated values. The TSV quoting
//! follows the usual CSV convention: a cell is wrapped in double quotes
//! only when it contains a tab, newline or quote, with inner quotes
//! doubled, which is exactly what a paste into Sheets expects.

use std::borrow::Cow;
use std::io::{self, Write};

use chrono::{DateTime, Utc};

use epicsheet_jira::issue::Issue;

use crate::analysis::{IssueAnalysis, IssuesCompletion, PointsCompletion};
use crate::severity::Severity;
use crate::verdict::{CheckCode, ReadinessVerdict};

/// Cells per report row.
pub const REPORT_COLUMNS: usize = 13;

/// Clickable issue key.
pub fn link_cell(link: &str, key: &str) -> String {
    format!("=HYPERLINK(\"{link}\",\"{key}\")")
}

/// Child-issue progress bar. Empty when there is nothing to count.
pub fn issues_bar(completion: &IssuesCompletion) -> String {
    if completion.total == 0 {
        return String::new();
    }
    sparkline(completion.resolved as f64, completion.total as f64, "green")
}

/// Story-point progress bar. Amber while any estimate is missing, so a
/// full-looking bar can still signal incomplete data.
pub fn points_bar(completion: &PointsCompletion) -> String {
    if completion.total == 0.0 {
        return String::new();
    }
    let color = if completion.unknown == 0 { "green" } else { "orange" };
    sparkline(completion.resolved, completion.total, color)
}

fn sparkline(resolved: f64, total: f64, color: &str) -> String {
    let remaining = total - resolved;
    format!(
        "=SPARKLINE({{{resolved},{remaining}}},{{\"charttype\",\"bar\";\"max\",{total};\"color1\",\"{color}\"}})"
    )
}

/// Date of the newest status comment.
pub fn date_cell(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn ballot_cell(ready: bool) -> String {
    if ready { "✔" } else { "✘" }.to_string()
}

pub fn severity_cell(severity: Severity) -> String {
    match severity {
        Severity::None => "",
        Severity::Green => "🟢",
        Severity::Yellow => "🟡",
        Severity::Red => "🔴",
    }
    .to_string()
}

/// Diagnostic codes, sorted alphabetically for stable display. The verdict
/// itself keeps check order; sorting happens only here.
pub fn codes_cell(codes: &[CheckCode]) -> String {
    let mut names: Vec<&'static str> = codes.iter().map(|c| c.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}

/// Assemble the full row for one issue.
pub fn report_row(
    issue: &Issue,
    analysis: &IssueAnalysis,
    verdict: &ReadinessVerdict,
) -> Vec<String> {
    vec![
        link_cell(&issue.link, &issue.key),
        issue.summary.clone(),
        issue.issue_type.to_string(),
        issue.priority.clone().unwrap_or_default(),
        issue.status.clone(),
        issue.owner.clone(),
        issue.qa_contact.clone(),
        issues_bar(&analysis.issues_completion),
        points_bar(&analysis.points_completion),
        date_cell(analysis.comment_date),
        ballot_cell(verdict.ready),
        severity_cell(verdict.severity),
        codes_cell(&verdict.codes),
    ]
}

/// Full-width section heading.
pub fn heading_row(name: &str) -> Vec<String> {
    let mut row = vec![name.to_string()];
    row.resize(REPORT_COLUMNS, String::new());
    row
}

/// Write one row, tab-separated, newline-terminated.
pub fn write_tsv_row<W: Write>(out: &mut W, cells: &[String]) -> io::Result<()> {
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            out.write_all(b"\t")?;
        }
        out.write_all(escape_cell(cell).as_bytes())?;
    }
    out.write_all(b"\n")
}

fn escape_cell(cell: &str) -> Cow<'_, str> {
    if !cell.contains(['\t', '\n', '\r', '"']) {
        return Cow::Borrowed(cell);
    }
    let mut quoted = String::with_capacity(cell.len() + 2);
    quoted.push('"');
    for ch in cell.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use epicsheet_jira::issue::IssueType;

    #[test]
    fn test_link_cell_formula() {
        assert_eq!(
            link_cell("https://issues.example.com/browse/E-1", "E-1"),
            "=HYPERLINK(\"https://issues.example.com/browse/E-1\",\"E-1\")"
        );
    }

    #[test]
    fn test_issues_bar_formula_and_empty_case() {
        let bar = issues_bar(&IssuesCompletion {
            resolved: 3,
            total: 8,
        });
        assert_eq!(
            bar,
            "=SPARKLINE({3,5},{\"charttype\",\"bar\";\"max\",8;\"color1\",\"green\"})"
        );
        assert_eq!(
            issues_bar(&IssuesCompletion {
                resolved: 0,
                total: 0
            }),
            ""
        );
    }

    #[test]
    fn test_points_bar_goes_amber_on_unknown_estimates() {
        let complete = points_bar(&PointsCompletion {
            resolved: 2.5,
            total: 4.0,
            unknown: 0,
        });
        assert_eq!(
            complete,
            "=SPARKLINE({2.5,1.5},{\"charttype\",\"bar\";\"max\",4;\"color1\",\"green\"})"
        );

        let partial = points_bar(&PointsCompletion {
            resolved: 2.0,
            total: 4.0,
            unknown: 1,
        });
        assert!(partial.contains("\"color1\",\"orange\""));

        assert_eq!(
            points_bar(&PointsCompletion {
                resolved: 0.0,
                total: 0.0,
                unknown: 2
            }),
            ""
        );
    }

    #[test]
    fn test_date_ballot_and_severity_cells() {
        let date = Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        assert_eq!(date_cell(Some(date)), "2024-03-08");
        assert_eq!(date_cell(None), "");
        assert_eq!(ballot_cell(true), "✔");
        assert_eq!(ballot_cell(false), "✘");
        assert_eq!(severity_cell(Severity::None), "");
        assert_eq!(severity_cell(Severity::Yellow), "🟡");
    }

    #[test]
    fn test_codes_cell_sorts_alphabetically_and_keeps_duplicates() {
        let cells = codes_cell(&[
            CheckCode::NoVersion,
            CheckCode::Alongside,
            CheckCode::NoVersion,
        ]);
        assert_eq!(cells, "ALONGSIDE,NOVERSION,NOVERSION");
        assert_eq!(codes_cell(&[]), "");
    }

    #[test]
    fn test_report_row_shape() {
        let mut issue = Issue::new("E-1", IssueType::Epic, "In Progress");
        issue.link = "https://issues.example.com/browse/E-1".to_string();
        issue.summary = "Installer rework".to_string();
        issue.priority = Some("Major".to_string());
        issue.owner = "Jane Doe".to_string();

        let analysis = IssueAnalysis::of(&issue, None);
        let verdict = ReadinessVerdict::new();
        let row = report_row(&issue, &analysis, &verdict);

        assert_eq!(row.len(), REPORT_COLUMNS);
        assert!(row[0].starts_with("=HYPERLINK"));
        assert_eq!(row[1], "Installer rework");
        assert_eq!(row[2], "Epic");
        assert_eq!(row[3], "Major");
        assert_eq!(row[4], "In Progress");
        assert_eq!(row[10], "✔");
    }

    #[test]
    fn test_heading_row_is_full_width() {
        let row = heading_row("Installer");
        assert_eq!(row.len(), REPORT_COLUMNS);
        assert_eq!(row[0], "Installer");
        assert!(row[1..].iter().all(String::is_empty));
    }

    #[test]
    fn test_tsv_quoting_rules() {
        let mut out = Vec::new();
        let cells = vec![
            "plain".to_string(),
            "with\ttab".to_string(),
            "say \"hi\"".to_string(),
        ];
        write_tsv_row(&mut out, &cells).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "plain\t\"with\ttab\"\t\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_formula_cells_are_quoted_for_their_inner_quotes() {
        let mut out = Vec::new();
        write_tsv_row(&mut out, &[link_cell("https://x", "K-1")]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"=HYPERLINK(\"\"https://x\"\",\"\"K-1\"\")\"\n"
        );
    }
}
