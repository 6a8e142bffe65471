use crate::args::ArgsError;
use crate::config::Config;
use crate::request::Rule;
use crate::tree::Directory;
use crate::tree::DirectoryTree;
use globset::GlobBuilder;
use globset::GlobMatcher;
use regex_lite::Regex;
use std::ffi::OsString;
use tracing::debug;

/// Compiled form of a non-counting [`Rule`].
#[derive(Debug, Clone)]
pub enum Predicate {
    Raw(OsString),
    Glob(GlobMatcher),
    Regex(Regex),
    Marker(Vec<OsString>),
}

impl Predicate {
    /// Compiles a name or marker rule. [`Rule::Count`] has no predicate form.
    pub fn compile(rule: &Rule, config: &Config) -> Result<Self, ArgsError> {
        let predicate = match rule {
            Rule::Count(levels) => {
                return Err(ArgsError::new(format!(
                    "-{levels} is a level count, not a directory predicate"
                )));
            }
            Rule::Raw(name) => Predicate::Raw(OsString::from(name)),
            Rule::Glob(pattern) => Predicate::Glob(compile_glob(pattern)?),
            Rule::Regex(pattern) => Predicate::Regex(
                Regex::new(pattern)
                    .map_err(|err| ArgsError::new(format!("invalid regex {pattern:?}: {err}")))?,
            ),
            Rule::Marker => {
                if config.markers.is_empty() {
                    return Err(ArgsError::new("no repository markers configured"));
                }
                Predicate::Marker(config.markers.iter().map(OsString::from).collect())
            }
        };
        Ok(predicate)
    }

    pub fn matches(&self, tree: &dyn DirectoryTree, candidate: &Directory) -> bool {
        if let Predicate::Marker(markers) = self {
            let found = markers
                .iter()
                .find(|marker| tree.has_entry(candidate.path(), marker));
            debug!(
                "(marker) {} -> found={:?}",
                candidate.path().display(),
                found
            );
            return found.is_some();
        }

        // the root has no basename and never matches a name rule
        let Some(basename) = candidate.basename() else {
            return false;
        };
        match self {
            Predicate::Raw(name) => {
                let found = basename == name.as_os_str();
                debug!("(raw) {} -> name={name:?}; found={found}", candidate.path().display());
                found
            }
            Predicate::Glob(matcher) => {
                let Some(name) = basename.to_str() else {
                    debug!("(glob) {} -> basename is not UTF-8", candidate.path().display());
                    return false;
                };
                let found = matcher.is_match(name);
                debug!(
                    "(glob) {} -> pattern={:?}; name={name:?}; found={found}",
                    candidate.path().display(),
                    matcher.glob().glob()
                );
                found
            }
            Predicate::Regex(regex) => {
                let Some(name) = basename.to_str() else {
                    debug!("(ere) {} -> basename is not UTF-8", candidate.path().display());
                    return false;
                };
                let found = regex.find(name);
                debug!(
                    "(ere) {} -> pattern={:?}; name={name:?}; found={found:?}",
                    candidate.path().display(),
                    regex.as_str()
                );
                found.is_some()
            }
            Predicate::Marker(_) => false,
        }
    }
}

/// Shell-style wildcard matcher for a single path component.
pub(crate) fn compile_glob(pattern: &str) -> Result<GlobMatcher, ArgsError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|err| ArgsError::new(format!("invalid glob pattern {pattern:?}: {err}")))
}
