use cdup_core::CdupError;
use cdup_core::Config;
use cdup_core::ConfigError;
use cdup_core::Invocation;
use cdup_core::parse_args;
use cdup_core::tree::DirectoryTree;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "CDUP_LOG";

pub const USAGE: &str = "\
usage: cdup START [OPTIONS...] [[--] UPWARD_RULE]

START is the directory to start from, normally \"$PWD\". The shell wrapper
evaluates the single line printed on stdout.

OPTIONS

    -h, --help              Show this help and return 0
    -s DIR                  Go downwards to DIR after going upwards, so that
                            there is only one `cd' in total. DIR may contain
                            shell wildcards and `**'; it must match exactly
                            one directory
    -l                      Print the absolute target directory instead of
                            changing to it; with a literal DIR the target is
                            printed whether or not it exists

UPWARD_RULE

    One of:

        <nothing>           Same as `cd ..'
        -NUM_LEVELS         Same as `cd ..' NUM_LEVELS times, stopping at `/'.
                            If NUM_LEVELS is empty or not all digits the whole
                            token is taken as NAME. `-0' does nothing
        [-r] NAME           Nearest ancestor named NAME. `-r' allows NAME to
                            start with `-'
        -g PATTERN          Nearest ancestor whose name matches the shell
                            wildcard PATTERN; quote it to avoid expansion
        -E REGEX            Nearest ancestor whose name contains a match for
                            REGEX
        -m                  Nearest ancestor holding a repository marker
                            (.git, .hg or .svn by default)

Options and UPWARD_RULE may be given in any order. `--' marks the start of
UPWARD_RULE. Short options cannot be merged, but an option may be merged
with its argument. The start directory itself is never tested, and only
`-NUM_LEVELS' and `-m' can reach `/'.

EXIT STATUS

    0                       Success
    1                       Filesystem error, e.g. START does not exist
    2                       Argument or configuration error
    4                       No matching directory, or DIR is ambiguous
    8                       Already in the target directory, when
                            same_dir_is_error is enabled

ENVIRONMENT

    CDUP_HOME               Directory holding config.toml
    CDUP_MARKERS            Comma-separated repository markers for `-m'
    CDUP_SAME_DIR_EXIT      Exit 8 instead of printing nothing when the
                            target is the start directory
    CDUP_MAX_DESCENT_DEPTH  How deep `**' in DIR may descend
    CDUP_LOG                Log filter, e.g. `debug'
";

/// What the binary should do once a command line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Help,
    /// The line for the shell to evaluate, if any.
    Line(Option<String>),
}

/// Parses `tokens`, then loads configuration and resolves the target.
///
/// Configuration is only consulted for navigation, so `-h` works even when
/// the config file is broken.
pub fn run<F>(
    tokens: &[String],
    tree: &dyn DirectoryTree,
    load_config: F,
) -> Result<Outcome, CdupError>
where
    F: FnOnce() -> Result<Config, ConfigError>,
{
    let request = match parse_args(tokens)? {
        Invocation::Help => return Ok(Outcome::Help),
        Invocation::Navigate(request) => request,
    };
    debug!("request: {request:?}");

    let config = load_config()?;
    let line = match cdup_core::navigate(&request, tree, &config)? {
        Some(command) => Some(command.render(&config)?),
        None => None,
    };
    Ok(Outcome::Line(line))
}

/// Logs go to stderr; stdout is reserved for the shell line.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();
}
