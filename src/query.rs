//! Matching of original paths against user queries.

use std::fmt;
use std::str::FromStr;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::errors::{CoreError, Result};

/// How free-text queries are interpreted.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum QueryMode {
    /// Unanchored regular expression search.
    #[default]
    Regex,
    /// Shell wildcard over the whole path; `*` also matches `/`.
    Glob,
    /// Case-insensitive substring.
    Literal,
    /// Case-sensitive equality with the whole path.
    Full,
}

impl QueryMode {
    pub const ALL: [QueryMode; 4] = [Self::Regex, Self::Glob, Self::Literal, Self::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Glob => "glob",
            Self::Literal => "literal",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| CoreError::invalid_input(format!("unknown query mode: {value}")))
    }
}

/// One compiled query.
#[derive(Debug, Clone)]
enum Compiled {
    Regex(Regex),
    Glob(GlobMatcher),
    /// Stored lowercased.
    Literal(String),
    Full(String),
}

impl Compiled {
    fn new(mode: QueryMode, query: &str) -> Result<Self> {
        let invalid = |reason: String| CoreError::InvalidPattern {
            mode: mode.as_str(),
            pattern: query.to_string(),
            reason,
        };
        Ok(match mode {
            QueryMode::Regex => Self::Regex(Regex::new(query).map_err(|err| invalid(err.to_string()))?),
            QueryMode::Glob => Self::Glob(
                Glob::new(query)
                    .map_err(|err| invalid(err.to_string()))?
                    .compile_matcher(),
            ),
            QueryMode::Literal => Self::Literal(query.to_lowercase()),
            QueryMode::Full => Self::Full(query.to_string()),
        })
    }

    fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(path),
            Self::Glob(glob) => glob.is_match(path),
            Self::Literal(needle) => path.to_lowercase().contains(needle.as_str()),
            Self::Full(expected) => path == expected.as_str(),
        }
    }
}

/// A set of queries matched with OR semantics. No queries match everything.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    queries: Vec<Compiled>,
}

impl Matcher {
    /// Compiles every query up front, so a bad pattern fails before any
    /// entry is looked at.
    pub fn new<S: AsRef<str>>(mode: QueryMode, queries: &[S]) -> Result<Self> {
        let queries = queries
            .iter()
            .map(|query| Compiled::new(mode, query.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { queries })
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|query| query.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(mode: QueryMode, query: &str, path: &str) -> bool {
        Matcher::new(mode, &[query]).unwrap().is_match(path)
    }

    #[test]
    fn empty_matcher_matches_everything() {
        let matcher = Matcher::new::<&str>(QueryMode::Full, &[]).unwrap();
        assert!(matcher.is_match("/anything"));
        assert!(matcher.is_empty());
    }

    #[test]
    fn regex_is_unanchored() {
        assert!(matches(QueryMode::Regex, r"rep.rt", "/home/u/report.txt"));
        assert!(matches(QueryMode::Regex, r"\.txt$", "/home/u/report.txt"));
        assert!(!matches(QueryMode::Regex, r"^report", "/home/u/report.txt"));
    }

    #[test]
    fn glob_matches_whole_path() {
        assert!(matches(QueryMode::Glob, "*.txt", "/home/u/report.txt"));
        assert!(matches(QueryMode::Glob, "/home/*/report.*", "/home/u/report.txt"));
        assert!(!matches(QueryMode::Glob, "report.txt", "/home/u/report.txt"));
    }

    #[test]
    fn literal_ignores_case() {
        assert!(matches(QueryMode::Literal, "REPORT", "/home/u/Report.txt"));
        assert!(!matches(QueryMode::Literal, "r.*t", "/home/u/report.txt"));
    }

    #[test]
    fn full_is_exact_and_case_sensitive() {
        assert!(matches(QueryMode::Full, "/home/u/report.txt", "/home/u/report.txt"));
        assert!(!matches(QueryMode::Full, "/home/u/Report.txt", "/home/u/report.txt"));
        assert!(!matches(QueryMode::Full, "/home/u/report", "/home/u/report.txt"));
    }

    #[test]
    fn queries_are_or_ed() {
        let matcher = Matcher::new(QueryMode::Literal, &["foo", "bar"]).unwrap();
        assert!(matcher.is_match("/x/bar"));
        assert!(!matcher.is_match("/x/baz"));
    }

    #[test]
    fn malformed_patterns_fail_at_construction() {
        assert!(matches!(
            Matcher::new(QueryMode::Regex, &["(unclosed"]),
            Err(CoreError::InvalidPattern { mode: "regex", .. })
        ));
        assert!(matches!(
            Matcher::new(QueryMode::Glob, &["[unclosed"]),
            Err(CoreError::InvalidPattern { mode: "glob", .. })
        ));
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!("glob".parse::<QueryMode>().unwrap(), QueryMode::Glob);
        assert!("fuzzy".parse::<QueryMode>().is_err());
    }
}
