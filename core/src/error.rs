use crate::args::ArgsError;
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CdupError>;

pub const EXIT_IO: u8 = 1;
pub const EXIT_ARGS: u8 = 2;
pub const EXIT_NOT_FOUND: u8 = 4;
pub const EXIT_SAME_DIRECTORY: u8 = 8;

#[derive(Debug, Error)]
pub enum CdupError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("already in {}", .0.display())]
    SameDirectory(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CdupError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status reported to the shell wrapper.
    pub fn exit_code(&self) -> u8 {
        match self {
            CdupError::Args(_) | CdupError::Config(_) => EXIT_ARGS,
            CdupError::NotFound(_) => EXIT_NOT_FOUND,
            CdupError::SameDirectory(_) => EXIT_SAME_DIRECTORY,
            CdupError::Io { .. } => EXIT_IO,
        }
    }
}

/// Failure to locate a target, either above or below the start.
#[derive(Debug, Error)]
pub enum NotFound {
    #[error("no ancestor of {} matches {rule}", start.display())]
    Ancestor { start: PathBuf, rule: String },

    #[error("no directory under {} matches {pattern:?}", base.display())]
    Descendant { base: PathBuf, pattern: String },

    #[error(
        "{pattern:?} is ambiguous under {}: {} and {}",
        base.display(),
        first.display(),
        second.display()
    )]
    Ambiguous {
        base: PathBuf,
        pattern: String,
        first: PathBuf,
        second: PathBuf,
    },
}
