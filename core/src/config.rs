use serde::Deserialize;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

pub const CDUP_HOME_ENV: &str = "CDUP_HOME";
pub const CONFIG_FILENAME: &str = "config.toml";

const MARKERS_ENV: &str = "CDUP_MARKERS";
const SAME_DIR_EXIT_ENV: &str = "CDUP_SAME_DIR_EXIT";
const MAX_DESCENT_DEPTH_ENV: &str = "CDUP_MAX_DESCENT_DEPTH";

const DEFAULT_MARKERS: &[&str] = &[".git", ".hg", ".svn"];
const DEFAULT_MAX_DESCENT_DEPTH: usize = 16;
/// `echo` may expand backslash escapes in the path under POSIX `sh`.
const DEFAULT_PRINT_COMMAND: &str = "printf '%s\\n'";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Effective settings after the config file and environment are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Entry names that identify a repository root for the marker rule.
    pub markers: Vec<String>,
    /// Extra levels a `**` segment may descend during downward resolution.
    pub max_descent_depth: usize,
    /// Report "already there" as an error instead of printing nothing.
    pub same_dir_is_error: bool,
    pub cd_command: String,
    pub print_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(ToString::to_string).collect(),
            max_descent_depth: DEFAULT_MAX_DESCENT_DEPTH,
            same_dir_is_error: false,
            cd_command: "cd".to_string(),
            print_command: DEFAULT_PRINT_COMMAND.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    markers: Option<Vec<String>>,
    max_descent_depth: Option<usize>,
    same_dir_is_error: Option<bool>,
    #[serde(default)]
    commands: CommandsToml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CommandsToml {
    cd: Option<String>,
    print: Option<String>,
}

impl Config {
    /// Loads `<home>/config.toml` when present and applies the process
    /// environment on top.
    pub fn load(home: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match home {
            Some(home) => Self::from_file(&home.join(CONFIG_FILENAME))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents, path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let parsed: ConfigToml = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::default();
        if let Some(markers) = parsed.markers {
            config.markers = markers;
        }
        if let Some(depth) = parsed.max_descent_depth {
            config.max_descent_depth = depth;
        }
        if let Some(flag) = parsed.same_dir_is_error {
            config.same_dir_is_error = flag;
        }
        if let Some(cd) = parsed.commands.cd {
            config.cd_command = non_empty("commands.cd", cd)?;
        }
        if let Some(print) = parsed.commands.print {
            config.print_command = non_empty("commands.print", print)?;
        }
        Ok(config)
    }

    /// Applies `CDUP_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(list) = lookup(MARKERS_ENV) {
            self.markers = list
                .split(',')
                .map(str::trim)
                .filter(|marker| !marker.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(value) = lookup(SAME_DIR_EXIT_ENV) {
            self.same_dir_is_error =
                parse_bool(&value).ok_or_else(|| invalid(SAME_DIR_EXIT_ENV, &value))?;
        }
        if let Some(value) = lookup(MAX_DESCENT_DEPTH_ENV) {
            self.max_descent_depth = value
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(MAX_DESCENT_DEPTH_ENV, &value))?;
        }
        Ok(())
    }
}

/// `$CDUP_HOME` when set, else the platform configuration directory.
pub fn find_cdup_home(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(home) = lookup(CDUP_HOME_ENV)
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::config_dir().map(|dir| dir.join("cdup"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(key, &value));
    }
    Ok(value)
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}
