use crate::args::ArgsError;
use crate::config::Config;
use crate::error::NotFound;
use crate::error::Result;
use crate::request::Rule;
use crate::rule::Predicate;
use crate::tree::Directory;
use crate::tree::DirectoryTree;
use tracing::debug;
use tracing::trace;

/// How far to climb from the start directory.
#[derive(Debug, Clone)]
pub enum Ascent {
    /// At most this many parent steps; stops quietly at the root.
    Count(usize),
    /// Nearest strict ancestor satisfying the predicate.
    Until { predicate: Predicate, rule: String },
}

impl Ascent {
    pub fn from_rule(rule: &Rule, config: &Config) -> std::result::Result<Self, ArgsError> {
        match rule {
            Rule::Count(levels) => Ok(Ascent::Count(*levels)),
            _ => Ok(Ascent::Until {
                predicate: Predicate::compile(rule, config)?,
                rule: rule.to_string(),
            }),
        }
    }
}

pub fn search(tree: &dyn DirectoryTree, start: &Directory, mode: &Ascent) -> Result<Directory> {
    match mode {
        Ascent::Count(levels) => ascend(tree, start, *levels),
        Ascent::Until { predicate, rule } => match search_upward(tree, start, predicate)? {
            Some(found) => Ok(found),
            None => Err(NotFound::Ancestor {
                start: start.path().to_path_buf(),
                rule: rule.clone(),
            }
            .into()),
        },
    }
}

fn ascend(tree: &dyn DirectoryTree, start: &Directory, levels: usize) -> Result<Directory> {
    let mut current = start.clone();
    for step in 0..levels {
        let parent = current.parent(tree)?;
        if parent == current {
            debug!(
                "reached root {} after {step} of {levels} level(s)",
                current.path().display()
            );
            break;
        }
        current = parent;
    }
    Ok(current)
}

/// The start itself is never tested; the root is the last candidate.
fn search_upward(
    tree: &dyn DirectoryTree,
    start: &Directory,
    predicate: &Predicate,
) -> Result<Option<Directory>> {
    let mut current = start.clone();
    loop {
        let parent = current.parent(tree)?;
        if parent == current {
            return Ok(None);
        }
        trace!("testing ancestor {}", parent.path().display());
        if predicate.matches(tree, &parent) {
            return Ok(Some(parent));
        }
        current = parent;
    }
}
