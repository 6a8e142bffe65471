use std::fmt;
use std::path::PathBuf;

/// How the upward target is selected. Exactly one rule per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Ascend at most this many levels.
    Count(usize),
    /// Nearest ancestor whose basename equals the value.
    Raw(String),
    /// Nearest ancestor whose basename matches the shell glob.
    Glob(String),
    /// Nearest ancestor whose basename contains a match of the regex.
    Regex(String),
    /// Nearest ancestor containing a repository marker entry.
    Marker,
}

impl Default for Rule {
    fn default() -> Self {
        Rule::Count(1)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Count(n) => write!(f, "{n} level(s) up"),
            Rule::Raw(name) => write!(f, "name {name:?}"),
            Rule::Glob(pattern) => write!(f, "glob {pattern:?}"),
            Rule::Regex(pattern) => write!(f, "regex {pattern:?}"),
            Rule::Marker => f.write_str("repository marker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub start_directory: PathBuf,
    pub rule: Rule,
    /// Pattern to resolve below the upward target (`-s`).
    pub subsequent: Option<String>,
    /// Print the target instead of changing into it (`-l`).
    pub list_only: bool,
}

impl NavigationRequest {
    pub fn new(start_directory: impl Into<PathBuf>) -> Self {
        Self {
            start_directory: start_directory.into(),
            rule: Rule::default(),
            subsequent: None,
            list_only: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Navigate(NavigationRequest),
}
