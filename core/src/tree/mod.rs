//! Directory identity and the filesystem view the resolver works against.

mod memory;
mod real;

pub use memory::MemoryTree;
pub use real::RealTree;

use crate::error::CdupError;
use crate::error::Result;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// Identity of a directory independent of the path used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirId {
    Inode { dev: u64, ino: u64 },
    /// Platforms without inode numbers compare fully resolved paths.
    Canonical(PathBuf),
}

/// A child directory reported by [`DirectoryTree::list_dirs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDir {
    pub name: OsString,
    /// The entry itself is a symlink that resolves to a directory.
    pub is_symlink: bool,
}

/// Read-only view of a directory hierarchy.
pub trait DirectoryTree {
    /// Identity of the directory at `path`, following symlinks. Fails if the
    /// path does not exist or is not a directory.
    fn identity(&self, path: &Path) -> io::Result<DirId>;

    /// Whether `dir` contains an entry called `name` of any kind.
    fn has_entry(&self, dir: &Path, name: &OsStr) -> bool;

    /// Child directories of `dir` sorted by name. Symlinks to directories are
    /// included; everything else is skipped.
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<ChildDir>>;
}

/// An absolute path paired with its identity. Equality compares identity only.
#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
    id: DirId,
}

impl Directory {
    pub fn open(tree: &dyn DirectoryTree, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match tree.identity(&path) {
            Ok(id) => Ok(Self { path, id }),
            Err(err) => Err(CdupError::io(path, err)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn id(&self) -> &DirId {
        &self.id
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Final path component; `None` for the filesystem root.
    pub fn basename(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// The lexical parent. The root is its own parent.
    pub fn parent(&self, tree: &dyn DirectoryTree) -> Result<Directory> {
        Directory::open(tree, parent_path(&self.path))
    }

    /// True when the parent has the same identity as `self`.
    pub fn is_root(&self, tree: &dyn DirectoryTree) -> Result<bool> {
        Ok(self.parent(tree)? == *self)
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Directory {}

pub(crate) fn parent_path(path: &Path) -> PathBuf {
    path.parent()
        .map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}
