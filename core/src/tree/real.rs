use super::ChildDir;
use super::DirId;
use super::DirectoryTree;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTree;

impl DirectoryTree for RealTree {
    fn identity(&self, path: &Path) -> io::Result<DirId> {
        let meta = fs::metadata(path)?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "not a directory",
            ));
        }
        dir_id(path, &meta)
    }

    fn has_entry(&self, dir: &Path, name: &OsStr) -> bool {
        fs::symlink_metadata(dir.join(name)).is_ok()
    }

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<ChildDir>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let is_symlink = file_type.is_symlink();
            let is_dir = if is_symlink {
                // dangling links are not directories
                fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir())
            } else {
                file_type.is_dir()
            };
            if is_dir {
                children.push(ChildDir {
                    name: entry.file_name(),
                    is_symlink,
                });
            }
        }
        children.sort_by(|a, b| a.name.as_os_str().cmp(b.name.as_os_str()));
        Ok(children)
    }
}

#[cfg(unix)]
fn dir_id(_path: &Path, meta: &fs::Metadata) -> io::Result<DirId> {
    use std::os::unix::fs::MetadataExt;
    Ok(DirId::Inode {
        dev: meta.dev(),
        ino: meta.ino(),
    })
}

#[cfg(not(unix))]
fn dir_id(path: &Path, _meta: &fs::Metadata) -> io::Result<DirId> {
    dunce::canonicalize(path).map(DirId::Canonical)
}
