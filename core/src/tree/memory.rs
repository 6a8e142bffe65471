use super::ChildDir;
use super::DirId;
use super::DirectoryTree;
use super::parent_path;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Node {
    Dir(u64),
    File,
    Symlink(PathBuf),
}

/// In-memory directory hierarchy with symlink support, for exercising the
/// resolver without touching the host filesystem.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: BTreeMap<PathBuf, Node>,
    next_ino: u64,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir(1));
        Self { nodes, next_ino: 2 }
    }

    /// Adds `path` and any missing ancestors as directories.
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.make_dirs(path.as_ref());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.make_dirs(&parent_path(path));
        self.nodes.insert(path.to_path_buf(), Node::File);
        self
    }

    /// Adds a symlink at `path`. Relative targets resolve against the link's
    /// parent, as on a real filesystem.
    pub fn with_symlink(mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.make_dirs(&parent_path(path));
        self.nodes
            .insert(path.to_path_buf(), Node::Symlink(target.as_ref().to_path_buf()));
        self
    }

    fn make_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::from("/");
        for component in path.components() {
            if let Component::Normal(name) = component {
                current.push(name);
                if !self.nodes.contains_key(&current) {
                    self.nodes.insert(current.clone(), Node::Dir(self.next_ino));
                    self.next_ino += 1;
                }
            }
        }
    }

    /// Physical location of `path` with every symlink followed.
    fn resolve(&self, path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
        let mut current = PathBuf::from("/");
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => current = PathBuf::from("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    current.pop();
                }
                Component::Normal(name) => {
                    if !matches!(self.nodes.get(&current), Some(Node::Dir(_))) {
                        return Err(not_a_directory(&current));
                    }
                    current.push(name);
                    match self.nodes.get(&current) {
                        None => {
                            return Err(io::Error::new(
                                io::ErrorKind::NotFound,
                                format!("{} does not exist", current.display()),
                            ));
                        }
                        Some(Node::Symlink(target)) => {
                            *hops += 1;
                            if *hops > MAX_SYMLINK_HOPS {
                                return Err(io::Error::other("too many levels of symbolic links"));
                            }
                            let target = parent_path(&current).join(target);
                            current = self.resolve(&target, hops)?;
                        }
                        Some(Node::Dir(_) | Node::File) => {}
                    }
                }
            }
        }
        Ok(current)
    }

    fn resolve_dir(&self, path: &Path) -> io::Result<(PathBuf, u64)> {
        let resolved = self.resolve(path, &mut 0)?;
        match self.nodes.get(&resolved) {
            Some(Node::Dir(ino)) => Ok((resolved, *ino)),
            _ => Err(not_a_directory(&resolved)),
        }
    }
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("{} is not a directory", path.display()),
    )
}

impl DirectoryTree for MemoryTree {
    fn identity(&self, path: &Path) -> io::Result<DirId> {
        let (_, ino) = self.resolve_dir(path)?;
        Ok(DirId::Inode { dev: 0, ino })
    }

    fn has_entry(&self, dir: &Path, name: &OsStr) -> bool {
        match self.resolve_dir(dir) {
            Ok((resolved, _)) => self.nodes.contains_key(&resolved.join(name)),
            Err(_) => false,
        }
    }

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<ChildDir>> {
        let (resolved, _) = self.resolve_dir(dir)?;
        let children = self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(resolved.as_path()))
            .filter(|(path, _)| self.identity(path).is_ok())
            .filter_map(|(path, node)| {
                path.file_name().map(|name| ChildDir {
                    name: name.to_os_string(),
                    is_symlink: matches!(node, Node::Symlink(_)),
                })
            })
            .collect();
        Ok(children)
    }
}
