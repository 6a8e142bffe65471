//! Target resolution for the `up` shell navigation command.
//!
//! A subprocess cannot change its parent shell's working directory, so the
//! `cdup` binary only computes where to go and prints a line such as
//! `cd /path/to/target` for a shell function to `eval`.
//!
//! ```text
//! argv ──> args::parse_args ──> NavigationRequest
//!                                   │
//!          search::search  <────────┤  (counted ascent or predicate ascent)
//!                                   │
//!          descend::resolve <───────┤  (optional `-s` pattern, exactly one match)
//!                                   │
//!          output::format_output ───┴──> Option<ShellCommand>
//! ```

pub mod args;
pub mod config;
pub mod descend;
mod error;
pub mod output;
pub mod request;
pub mod rule;
pub mod search;
pub mod tree;

pub use args::ArgsError;
pub use args::parse_args;
pub use config::Config;
pub use config::ConfigError;
pub use error::CdupError;
pub use error::EXIT_ARGS;
pub use error::EXIT_IO;
pub use error::EXIT_NOT_FOUND;
pub use error::EXIT_SAME_DIRECTORY;
pub use error::NotFound;
pub use error::Result;
pub use output::ShellCommand;
pub use request::Invocation;
pub use request::NavigationRequest;
pub use request::Rule;

use path_absolutize::Absolutize;
use search::Ascent;
use tracing::debug;
use tree::Directory;
use tree::DirectoryTree;

/// Runs the whole resolution pipeline for one request.
pub fn navigate(
    request: &NavigationRequest,
    tree: &dyn DirectoryTree,
    config: &Config,
) -> Result<Option<ShellCommand>> {
    let start_path = request
        .start_directory
        .absolutize()
        .map_err(|err| CdupError::io(&request.start_directory, err))?;
    let start = Directory::open(tree, start_path.into_owned())?;

    let mode = Ascent::from_rule(&request.rule, config)?;
    let base = search::search(tree, &start, &mode)?;
    debug!(
        "{} resolved upward to {}",
        request.rule,
        base.path().display()
    );

    let resolved = match request.subsequent.as_deref() {
        None => base.into_path(),
        Some(pattern) if request.list_only && descend::is_literal(pattern) => {
            descend::join_literal(base.path(), pattern)?
        }
        Some(pattern) => {
            descend::resolve(tree, &base, pattern, config.max_descent_depth)?.into_path()
        }
    };

    output::format_output(tree, &start, resolved, request.list_only, config)
}
