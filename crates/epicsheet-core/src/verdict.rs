//! Readiness verdict: the accumulator every check folds into.

use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Diagnostic code attached to a verdict by a failed or notable check.
///
/// The canonical string forms are the uppercase names; they appear verbatim
/// in report cells and JSON output, so this vocabulary is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckCode {
    Obsolete,
    Alongside,
    NoVersion,
    MultiVersion,
    NoStories,
    NoDescription,
    NoAcks,
    NoDeliveryOwner,
    NoQe,
    NoFeature,
    NoDoc,
    NoQeMismatch,
    NoQaContact,
    NoCriteria,
    NoPriority,
    NotStarted,
    NoStoryPoints,
    Impediment,
    NoInitiative,
    IssueNoComponent,
    NoComponent,
    NotDone,
    NoStatusComment,
    NoEpic,
    NoActiveStories,
    NoDesign,
}

impl CheckCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Obsolete => "OBSOLETE",
            Self::Alongside => "ALONGSIDE",
            Self::NoVersion => "NOVERSION",
            Self::MultiVersion => "MULTIVERSION",
            Self::NoStories => "NOSTORIES",
            Self::NoDescription => "NODESCRIPTION",
            Self::NoAcks => "NOACKS",
            Self::NoDeliveryOwner => "NODELIVERYOWNER",
            Self::NoQe => "NOQE",
            Self::NoFeature => "NOFEATURE",
            Self::NoDoc => "NODOC",
            Self::NoQeMismatch => "NOQEMISMATCH",
            Self::NoQaContact => "NOQACONTACT",
            Self::NoCriteria => "NOCRITERIA",
            Self::NoPriority => "NOPRIORITY",
            Self::NotStarted => "NOTSTARTED",
            Self::NoStoryPoints => "NOSTORYPOINTS",
            Self::Impediment => "IMPEDIMENT",
            Self::NoInitiative => "NOINITIATIVE",
            Self::IssueNoComponent => "ISSUENOCOMPONENT",
            Self::NoComponent => "NOCOMPONENT",
            Self::NotDone => "NOTDONE",
            Self::NoStatusComment => "NOSTATUSCOMMENT",
            Self::NoEpic => "NOEPIC",
            Self::NoActiveStories => "NOACTIVESTORIES",
            Self::NoDesign => "NODESIGN",
        }
    }
}

impl std::fmt::Display for CheckCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of evaluating one issue against the whole check registry.
///
/// Starts optimistic and only degrades: `ready` is a one-way latch,
/// `severity` only climbs, `codes` is append-only in check order. The three
/// mutators chain, so a check can record its full effect in one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessVerdict {
    pub ready: bool,
    pub severity: Severity,
    pub codes: Vec<CheckCode>,
}

impl ReadinessVerdict {
    pub fn new() -> Self {
        ReadinessVerdict {
            ready: true,
            severity: Severity::None,
            codes: Vec::new(),
        }
    }

    /// Latch the verdict to not ready. Idempotent.
    pub fn mark_not_ready(&mut self) -> &mut Self {
        self.ready = false;
        self
    }

    /// Raise severity to at least `level`. Never lowers it.
    pub fn raise_severity(&mut self, level: Severity) -> &mut Self {
        self.severity = self.severity.raise(level);
        self
    }

    /// Append a diagnostic code. Duplicates are kept.
    pub fn push_code(&mut self, code: CheckCode) -> &mut Self {
        self.codes.push(code);
        self
    }

    pub fn has_code(&self, code: CheckCode) -> bool {
        self.codes.contains(&code)
    }
}

impl Default for ReadinessVerdict {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_verdict_is_optimistic() {
        let verdict = ReadinessVerdict::new();
        assert!(verdict.ready);
        assert_eq!(verdict.severity, Severity::None);
        assert!(verdict.codes.is_empty());
    }

    #[test]
    fn test_ready_is_a_one_way_latch() {
        let mut verdict = ReadinessVerdict::new();
        verdict.mark_not_ready();
        assert!(!verdict.ready);
        verdict.mark_not_ready();
        assert!(!verdict.ready);
    }

    #[test]
    fn test_severity_never_drops() {
        let mut verdict = ReadinessVerdict::new();
        verdict.raise_severity(Severity::Red);
        verdict.raise_severity(Severity::Green);
        assert_eq!(verdict.severity, Severity::Red);
    }

    #[test]
    fn test_codes_keep_order_and_duplicates() {
        let mut verdict = ReadinessVerdict::new();
        verdict
            .push_code(CheckCode::NoVersion)
            .push_code(CheckCode::NoAcks)
            .push_code(CheckCode::NoVersion);
        assert_eq!(
            verdict.codes,
            vec![CheckCode::NoVersion, CheckCode::NoAcks, CheckCode::NoVersion]
        );
        assert!(verdict.has_code(CheckCode::NoAcks));
        assert!(!verdict.has_code(CheckCode::Obsolete));
    }

    #[test]
    fn test_mutators_chain() {
        let mut verdict = ReadinessVerdict::new();
        verdict
            .mark_not_ready()
            .raise_severity(Severity::Yellow)
            .push_code(CheckCode::NoComponent);
        assert!(!verdict.ready);
        assert_eq!(verdict.severity, Severity::Yellow);
        assert_eq!(verdict.codes, vec![CheckCode::NoComponent]);
    }

    #[test]
    fn test_code_strings_match_serde_form() {
        assert_eq!(
            serde_json::to_string(&CheckCode::NoDeliveryOwner).unwrap(),
            "\"NODELIVERYOWNER\""
        );
        assert_eq!(CheckCode::NoDeliveryOwner.to_string(), "NODELIVERYOWNER");
        assert_eq!(CheckCode::IssueNoComponent.as_str(), "ISSUENOCOMPONENT");
    }
}
