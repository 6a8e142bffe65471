use crate::args::ArgsError;
use crate::config::Config;
use crate::error::CdupError;
use crate::error::Result;
use crate::tree::Directory;
use crate::tree::DirectoryTree;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// The single line handed back to the shell wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Print(PathBuf),
    ChangeDirectory(PathBuf),
}

impl ShellCommand {
    pub fn path(&self) -> &Path {
        match self {
            ShellCommand::Print(path) | ShellCommand::ChangeDirectory(path) => path,
        }
    }

    /// Renders the command with the path quoted for `eval`.
    pub fn render(&self, config: &Config) -> Result<String> {
        let verb = match self {
            ShellCommand::Print(_) => &config.print_command,
            ShellCommand::ChangeDirectory(_) => &config.cd_command,
        };
        let path = self.path();
        let Some(raw) = path.to_str() else {
            return Err(ArgsError::new(format!("invalid Unicode in {}", path.display())).into());
        };
        let quoted = shlex::try_quote(raw)
            .map_err(|_| ArgsError::new(format!("cannot quote {raw:?} for the shell")))?;
        Ok(format!("{verb} {quoted}"))
    }
}

/// Decides what, if anything, the wrapper should run for `resolved`.
pub fn format_output(
    tree: &dyn DirectoryTree,
    start: &Directory,
    resolved: PathBuf,
    list_only: bool,
    config: &Config,
) -> Result<Option<ShellCommand>> {
    if list_only {
        return Ok(Some(ShellCommand::Print(resolved)));
    }
    if let Ok(id) = tree.identity(&resolved)
        && id == *start.id()
    {
        debug!("{} is the start directory", resolved.display());
        if config.same_dir_is_error {
            return Err(CdupError::SameDirectory(resolved));
        }
        return Ok(None);
    }
    Ok(Some(ShellCommand::ChangeDirectory(resolved)))
}
