//! Downward resolution of the `-s` pattern below the upward target.
//!
//! The pattern is matched one path segment at a time so that literal
//! segments never require listing a directory and `**` is the only segment
//! that recurses. Exactly one directory must match.

use crate::args::ArgsError;
use crate::error::CdupError;
use crate::error::NotFound;
use crate::error::Result;
use crate::rule::compile_glob;
use crate::tree::ChildDir;
use crate::tree::Directory;
use crate::tree::DirectoryTree;
use globset::GlobMatcher;
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

const GLOB_META: &[char] = &['*', '?', '['];

#[derive(Debug)]
enum Segment {
    Current,
    Parent,
    Literal(OsString),
    /// `dotted` segments may match hidden entries.
    Glob { matcher: GlobMatcher, dotted: bool },
    AnyDepth,
}

/// True when `pattern` contains no wildcard syntax and names a single path.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(GLOB_META)
}

/// Lexically joins a literal pattern onto `base` without touching the
/// filesystem.
pub fn join_literal(base: &Path, pattern: &str) -> Result<PathBuf> {
    check_relative(pattern)?;
    let joined = base.join(pattern);
    match joined.absolutize() {
        Ok(normalized) => Ok(normalized.into_owned()),
        Err(err) => Err(CdupError::io(joined, err)),
    }
}

pub fn resolve(
    tree: &dyn DirectoryTree,
    base: &Directory,
    pattern: &str,
    max_depth: usize,
) -> Result<Directory> {
    let segments = parse_pattern(pattern)?;
    let mut walk = Walk {
        tree,
        max_depth,
        found: Vec::new(),
    };
    walk.visit(base, &segments, 0)?;

    let mut found = walk.found.into_iter();
    match (found.next(), found.next()) {
        (Some(only), None) => {
            debug!("{pattern:?} resolved to {}", only.path().display());
            Ok(only)
        }
        (None, _) => Err(NotFound::Descendant {
            base: base.path().to_path_buf(),
            pattern: pattern.to_string(),
        }
        .into()),
        (Some(first), Some(second)) => Err(NotFound::Ambiguous {
            base: base.path().to_path_buf(),
            pattern: pattern.to_string(),
            first: first.into_path(),
            second: second.into_path(),
        }
        .into()),
    }
}

fn check_relative(pattern: &str) -> std::result::Result<(), ArgsError> {
    if pattern.is_empty() {
        return Err(ArgsError::new("DIR must not be empty"));
    }
    if pattern.starts_with('/') {
        return Err(ArgsError::new(format!("DIR must be relative: {pattern}")));
    }
    Ok(())
}

fn parse_pattern(pattern: &str) -> std::result::Result<Vec<Segment>, ArgsError> {
    check_relative(pattern)?;
    pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            Ok(match segment {
                "." => Segment::Current,
                ".." => Segment::Parent,
                "**" => Segment::AnyDepth,
                glob if !is_literal(glob) => Segment::Glob {
                    matcher: compile_glob(glob)?,
                    dotted: glob.starts_with('.'),
                },
                literal => Segment::Literal(OsString::from(literal)),
            })
        })
        .collect()
}

fn is_hidden(child: &ChildDir) -> bool {
    child.name.as_encoded_bytes().starts_with(b".")
}

struct Walk<'a> {
    tree: &'a dyn DirectoryTree,
    max_depth: usize,
    /// Distinct matches so far; the walk stops once there are two.
    found: Vec<Directory>,
}

impl Walk<'_> {
    fn done(&self) -> bool {
        self.found.len() > 1
    }

    fn visit(&mut self, dir: &Directory, segments: &[Segment], depth: usize) -> Result<()> {
        if self.done() {
            return Ok(());
        }
        let Some((segment, rest)) = segments.split_first() else {
            if !self.found.contains(dir) {
                self.found.push(dir.clone());
            }
            return Ok(());
        };

        match segment {
            Segment::Current => self.visit(dir, rest, depth),
            Segment::Parent => {
                let parent = dir.parent(self.tree)?;
                self.visit(&parent, rest, depth)
            }
            Segment::Literal(name) => match self.open(dir.path().join(name))? {
                Some(child) => self.visit(&child, rest, depth),
                None => Ok(()),
            },
            Segment::Glob { matcher, dotted } => {
                for child in self.children(dir)? {
                    if self.done() {
                        break;
                    }
                    if (is_hidden(&child) && !*dotted) || !matcher.is_match(&child.name) {
                        continue;
                    }
                    if let Some(child) = self.open(dir.path().join(&child.name))? {
                        self.visit(&child, rest, depth)?;
                    }
                }
                Ok(())
            }
            Segment::AnyDepth => {
                self.visit(dir, rest, depth)?;
                if depth >= self.max_depth {
                    debug!("** stopped at depth {depth} in {}", dir.path().display());
                    return Ok(());
                }
                for child in self.children(dir)? {
                    if self.done() {
                        break;
                    }
                    // symlinked directories may form cycles
                    if child.is_symlink || is_hidden(&child) {
                        continue;
                    }
                    if let Some(child) = self.open(dir.path().join(&child.name))? {
                        self.visit(&child, segments, depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// A candidate that is missing or not a directory is no match; any other
    /// failure is an error.
    fn open(&self, path: PathBuf) -> Result<Option<Directory>> {
        match Directory::open(self.tree, path) {
            Ok(dir) => Ok(Some(dir)),
            Err(CdupError::Io { path, source })
                if matches!(
                    source.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                debug!("skipping {}: {source}", path.display());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn children(&self, dir: &Directory) -> Result<Vec<ChildDir>> {
        self.tree
            .list_dirs(dir.path())
            .map_err(|err| CdupError::io(dir.path(), err))
    }
}
