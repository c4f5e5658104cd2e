//! Severity lattice for readiness appraisals.

use serde::{Deserialize, Serialize};

/// Attention level attached to a verdict.
///
/// Ordered from quiet to loud. Merging keeps the louder level, so severity
/// only ever climbs while checks run, it is never talked back down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// No appraisal recorded. Distinct from an explicit green.
    None,
    /// On track.
    Green,
    /// Needs attention.
    Yellow,
    /// At risk.
    Red,
}

impl Severity {
    /// The louder of the two levels.
    pub fn raise(self, other: Severity) -> Severity {
        self.max(other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::None < Severity::Green);
        assert!(Severity::Green < Severity::Yellow);
        assert!(Severity::Yellow < Severity::Red);
    }

    #[test]
    fn test_raise_keeps_the_louder_level() {
        assert_eq!(Severity::None.raise(Severity::Green), Severity::Green);
        assert_eq!(Severity::Red.raise(Severity::Yellow), Severity::Red);
        assert_eq!(Severity::Yellow.raise(Severity::Yellow), Severity::Yellow);
    }

    #[test]
    fn test_raise_is_commutative_and_idempotent() {
        for a in [
            Severity::None,
            Severity::Green,
            Severity::Yellow,
            Severity::Red,
        ] {
            assert_eq!(a.raise(a), a);
            for b in [
                Severity::None,
                Severity::Green,
                Severity::Yellow,
                Severity::Red,
            ] {
                assert_eq!(a.raise(b), b.raise(a));
            }
        }
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        assert_eq!(serde_json::to_string(&Severity::Yellow).unwrap(), "\"YELLOW\"");
        let parsed: Severity = serde_json::from_str("\"RED\"").unwrap();
        assert_eq!(parsed, Severity::Red);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(Severity::None.to_string(), "NONE");
        assert_eq!(Severity::Green.to_string(), "GREEN");
    }
}
