//! Validation of free-text classifier replies.

use std::collections::HashSet;

use serde::Deserialize;

/// Lines of a reply that matched known keys, plus the count of lines that
/// did not.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: Vec<String>,
    pub rejected_unknown: usize,
}

/// Keeps reply lines that are exact keys according to `is_known`.
///
/// Lines are trimmed and blank lines ignored. Anything else that is not a
/// key (explanations, partial or invented codes) is counted and dropped.
/// Repeated keys are kept once, at their first position.
pub fn filter_known_lines<F>(raw: &str, is_known: F) -> MatchOutcome
where
    F: Fn(&str) -> bool,
{
    let mut outcome = MatchOutcome::default();
    let mut seen = HashSet::new();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if !is_known(line) {
            outcome.rejected_unknown += 1;
            continue;
        }
        if seen.insert(line) {
            outcome.matched.push(line.to_string());
        }
    }

    outcome
}

/// How a yes/no reply is turned into a verdict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictRule {
    /// Accept when "yes" appears anywhere in the reply, any case.
    #[default]
    ContainsYes,
    /// Accept only a reply that is exactly "yes", any case, ignoring
    /// surrounding whitespace and trailing punctuation.
    StrictYes,
}

impl VerdictRule {
    pub fn accepts(self, reply: &str) -> bool {
        match self {
            VerdictRule::ContainsYes => reply.to_lowercase().contains("yes"),
            VerdictRule::StrictYes => reply
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_punctuation())
                .eq_ignore_ascii_case("yes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_exact_known_keys() {
        let known = ["07021000"];
        let outcome = filter_known_lines("07021000\nnot sure\n99999999", |line| {
            known.contains(&line)
        });

        assert_eq!(outcome.matched, vec!["07021000".to_string()]);
        assert_eq!(outcome.rejected_unknown, 2);
    }

    #[test]
    fn matching_is_case_sensitive_and_not_fuzzy() {
        let known = ["50/2017-Customs"];
        let outcome = filter_known_lines(
            "50/2017-customs\n50/2017\nNotification 50/2017-Customs",
            |line| known.contains(&line),
        );

        assert!(outcome.matched.is_empty());
        assert_eq!(outcome.rejected_unknown, 3);
    }

    #[test]
    fn trims_lines_skips_blanks_and_deduplicates() {
        let known = ["A", "B"];
        let outcome = filter_known_lines("  B \r\n\nA\nB\n", |line| known.contains(&line));

        assert_eq!(outcome.matched, vec!["B".to_string(), "A".to_string()]);
        assert_eq!(outcome.rejected_unknown, 0);
    }

    #[test]
    fn contains_yes_accepts_anywhere() {
        assert!(VerdictRule::ContainsYes.accepts("Yes."));
        assert!(VerdictRule::ContainsYes.accepts("I would say YES, it matches"));
        assert!(VerdictRule::ContainsYes.accepts("eyes"));
        assert!(!VerdictRule::ContainsYes.accepts("No"));
    }

    #[test]
    fn strict_yes_requires_a_bare_answer() {
        assert!(VerdictRule::StrictYes.accepts(" yes "));
        assert!(VerdictRule::StrictYes.accepts("Yes."));
        assert!(!VerdictRule::StrictYes.accepts("I would say yes"));
        assert!(!VerdictRule::StrictYes.accepts("no"));
    }
}
