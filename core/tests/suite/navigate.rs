use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_matches::assert_matches;
use cdup_core::CdupError;
use cdup_core::Config;
use cdup_core::Invocation;
use cdup_core::NavigationRequest;
use cdup_core::NotFound;
use cdup_core::ShellCommand;
use cdup_core::navigate;
use cdup_core::parse_args;
use cdup_core::tree::RealTree;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn request(start: &Path, rest: &[&str]) -> NavigationRequest {
    let mut tokens = vec![start.to_string_lossy().into_owned()];
    tokens.extend(rest.iter().map(ToString::to_string));
    match parse_args(&tokens) {
        Ok(Invocation::Navigate(request)) => request,
        other => panic!("unexpected parse result {other:?}"),
    }
}

fn run(start: &Path, rest: &[&str]) -> cdup_core::Result<Option<ShellCommand>> {
    navigate(&request(start, rest), &RealTree, &Config::default())
}

fn cd(path: &Path) -> Option<ShellCommand> {
    Some(ShellCommand::ChangeDirectory(path.to_path_buf()))
}

#[test]
fn regex_and_count_rules_on_disk() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("alpha/beta/gamma");
    fs::create_dir_all(&start)?;

    assert_eq!(run(&start, &["-E", "^al"])?, cd(&root.path().join("alpha")));
    assert_eq!(run(&start, &["-2"])?, cd(&root.path().join("alpha")));
    assert_eq!(run(&start, &["beta"])?, cd(&root.path().join("alpha/beta")));
    assert_eq!(run(&start, &["-g", "b?ta"])?, cd(&root.path().join("alpha/beta")));
    Ok(())
}

#[test]
fn marker_accepts_git_directories_and_files() -> Result<()> {
    let root = TempDir::new()?;
    let repo = root.path().join("repo");
    let worktree = repo.join("nested/worktree");
    fs::create_dir_all(repo.join(".git"))?;
    fs::create_dir_all(worktree.join("src"))?;
    fs::write(worktree.join(".git"), "gitdir: ../../.git/worktrees/wt\n")?;

    assert_eq!(run(&worktree.join("src"), &["-m"])?, cd(&worktree));
    assert_eq!(run(&worktree, &["-m"])?, cd(&repo));
    Ok(())
}

#[test]
fn unmatched_rule_reports_not_found() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("a/b");
    fs::create_dir_all(&start)?;

    let err = run(&start, &["-r", "no-such-ancestor"]).unwrap_err();
    assert_matches!(err, CdupError::NotFound(NotFound::Ancestor { .. }));
    assert_eq!(err.exit_code(), 4);
    Ok(())
}

#[test]
fn subsequent_pattern_must_be_unique() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("y/z");
    fs::create_dir_all(&start)?;
    fs::create_dir(root.path().join("y/buildA"))?;
    fs::write(root.path().join("y/build.log"), "")?;

    assert_eq!(
        run(&start, &["-s", "build*"])?,
        cd(&root.path().join("y/buildA"))
    );

    fs::create_dir(root.path().join("y/buildB"))?;
    let err = run(&start, &["-s", "build*"]).unwrap_err();
    assert_matches!(err, CdupError::NotFound(NotFound::Ambiguous { .. }));
    Ok(())
}

#[test]
fn recursive_pattern_descends() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("proj/src");
    fs::create_dir_all(&start)?;
    fs::create_dir_all(root.path().join("proj/crates/core/target"))?;

    assert_eq!(
        run(&start, &["-s", "**/target"])?,
        cd(&root.path().join("proj/crates/core/target"))
    );
    Ok(())
}

#[test]
fn list_only_prints_missing_literal_target() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("a/b");
    fs::create_dir_all(&start)?;

    assert_eq!(
        run(&start, &["-l", "-s", "out/../dist"])?,
        Some(ShellCommand::Print(root.path().join("a/dist")))
    );
    assert_eq!(run(&start, &["-s", "dist"]).unwrap_err().exit_code(), 4);
    Ok(())
}

#[test]
fn missing_start_is_an_io_error() -> Result<()> {
    let root = TempDir::new()?;
    let err = run(&root.path().join("gone"), &[]).unwrap_err();
    assert_matches!(err, CdupError::Io { .. });
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[test]
fn start_that_is_a_file_is_an_io_error() -> Result<()> {
    let root = TempDir::new()?;
    let file = root.path().join("notes.txt");
    fs::write(&file, "")?;
    assert_eq!(run(&file, &[]).unwrap_err().exit_code(), 1);
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_start_keeps_logical_parents() -> Result<()> {
    let root = TempDir::new()?;
    let real = root.path().join("data/projects/demo");
    let home = root.path().join("home");
    fs::create_dir_all(&real)?;
    fs::create_dir_all(&home)?;
    std::os::unix::fs::symlink(&real, home.join("demo"))?;

    let start = home.join("demo");
    assert_eq!(run(&start, &[])?, cd(&home));
    assert_eq!(run(&start, &["projects"]).unwrap_err().exit_code(), 4);
    Ok(())
}

#[cfg(unix)]
#[test]
fn landing_on_the_start_through_a_symlink_is_a_no_op() -> Result<()> {
    let root = TempDir::new()?;
    let start = root.path().join("work/real");
    fs::create_dir_all(&start)?;
    std::os::unix::fs::symlink(&start, root.path().join("work/alias"))?;

    assert_eq!(run(&start, &["-s", "alias"])?, None);

    let config = Config {
        same_dir_is_error: true,
        ..Config::default()
    };
    let err = navigate(&request(&start, &["-s", "alias"]), &RealTree, &config).unwrap_err();
    assert_matches!(err, CdupError::SameDirectory(_));
    assert_eq!(err.exit_code(), 8);
    Ok(())
}
