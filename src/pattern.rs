use regex::{Regex, RegexBuilder};

use crate::error::PipelineError;

/// Case-insensitive name filter.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, PipelineError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|source_err| PipelineError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// The three name filters applied while walking boards down to cards.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub board: Pattern,
    pub list: Pattern,
    pub card: Pattern,
}

impl Patterns {
    pub fn new(board: &str, list: &str, card: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            board: Pattern::new(board)?,
            list: Pattern::new(list)?,
            card: Pattern::new(card)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        let p = Pattern::new("sprint.*").unwrap();
        assert!(p.is_match("Sprint 42"));
        assert!(p.is_match("SPRINT"));
        assert!(!p.is_match("Backlog"));
    }

    #[test]
    fn pattern_is_unanchored() {
        let p = Pattern::new("PER (RELEASE|BUILD)").unwrap();
        assert!(p.is_match("MUST per build"));
        assert!(!p.is_match("MUST PER SPRINT"));
    }

    #[test]
    fn wildcard_matches_everything() {
        let p = Pattern::new(".*").unwrap();
        assert!(p.is_match(""));
        assert!(p.is_match("whatever"));
        assert_eq!(p.as_str(), ".*");
    }

    #[test]
    fn invalid_pattern_reports_source() {
        let err = Pattern::new("(unclosed").unwrap_err();
        match err {
            PipelineError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn patterns_fail_on_first_bad_expression() {
        assert!(Patterns::new(".*", "[", ".*").is_err());
        assert!(Patterns::new("a", "b", "c").is_ok());
    }
}
