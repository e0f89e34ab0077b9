//! Fixtures and process helpers shared by the difftool tests
//!
//! Repositories are laid down with real git so the trees, index and
//! refs under test match what users actually have on disk.

use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::{Path, PathBuf};

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("temp dir for the test repository")
}

/// A repository with one commit tracking `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn committed_repository_dir(repository_dir: TempDir) -> TempDir {
    git_init(repository_dir.path());

    let root = repository_dir.path();
    for (relative, content) in [
        ("1.txt", "one\n"),
        ("a/2.txt", "two\n"),
        ("a/b/3.txt", "three\n"),
    ] {
        write_file(FileSpec::new(root.join(relative), content.to_string()));
    }

    git_add_all(root);
    git_commit(root, "Initial commit");

    repository_dir
}

/// Adds a second commit on top, revising `1.txt` and adding `c/4.txt`
#[fixture]
pub fn two_commit_repository_dir(committed_repository_dir: TempDir) -> TempDir {
    let root = committed_repository_dir.path();
    for (relative, content) in [("1.txt", "one, revised\n"), ("c/4.txt", "four\n")] {
        write_file(FileSpec::new(root.join(relative), content.to_string()));
    }

    git_add_all(root);
    git_commit(root, "Second commit");

    committed_repository_dir
}

pub fn run_viff_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("viff").expect("viff binary should be built");
    cmd.current_dir(dir).args(args);
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir).args(args);
    cmd
}

pub fn git_init(dir: &Path) {
    run_git_command(dir, &["init", "-q", "-b", "main"])
        .assert()
        .success();
}

pub fn git_add_all(dir: &Path) {
    run_git_command(dir, &["add", "."]).assert().success();
}

pub fn git_commit(dir: &Path, message: &str) {
    let mut cmd = run_git_command(
        dir,
        &[
            "-c",
            "user.name=fake_user",
            "-c",
            "user.email=fake_email@email.com",
            "commit",
            "-q",
            "--no-gpg-sign",
            "-m",
            message,
        ],
    );
    cmd.envs([
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"),
        ("GIT_COMMITTER_DATE", "2023-01-01 12:00:00 +0000"),
    ]);
    cmd.assert().success();
}

pub fn set_git_config(dir: &Path, key: &str, value: &str) {
    run_git_command(dir, &["config", key, value])
        .assert()
        .success();
}

/// Register a user-defined tool under the given name
pub fn register_tool(dir: &Path, name: &str, command: &str) {
    set_git_config(dir, &format!("difftool.{name}.cmd"), command);
}

/// Register a tool that appends `local|remote|merged` to `.git/tool.log` on
/// every launch. The log lives under `.git` so it never joins the diff.
pub fn register_logging_tool(dir: &Path, name: &str) {
    register_tool(
        dir,
        name,
        r#"printf '%s|%s|%s\n' "$LOCAL" "$REMOTE" "$MERGED" >> .git/tool.log"#,
    );
}

/// Register a tool that appends the content of one side to `.git/content.log`
pub fn register_content_tool(dir: &Path, name: &str, side: &str) {
    register_tool(dir, name, &format!(r#"cat "${side}" >> .git/content.log"#));
}

pub fn tool_log(dir: &Path) -> Vec<String> {
    read_log(dir, "tool.log")
}

pub fn content_log(dir: &Path) -> String {
    let path = dir.join(".git").join("content.log");
    if !path.exists() {
        return String::new();
    }

    std::fs::read_to_string(path).expect("Failed to read content log")
}

pub fn read_log(dir: &Path, name: &str) -> Vec<String> {
    let path = dir.join(".git").join(name);
    if !path.exists() {
        return Vec::new();
    }

    std::fs::read_to_string(path)
        .expect("Failed to read tool log")
        .lines()
        .map(|line| line.to_string())
        .collect()
}

/// Split one `local|remote|merged` log line into its three paths
pub fn split_log_line(line: &str) -> (PathBuf, PathBuf, PathBuf) {
    let mut parts = line.split('|');
    let local = PathBuf::from(parts.next().expect("missing local path"));
    let remote = PathBuf::from(parts.next().expect("missing remote path"));
    let merged = PathBuf::from(parts.next().expect("missing merged path"));
    (local, remote, merged)
}

/// Commit id HEAD currently resolves to, read straight off disk
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let git_dir = dir.join(".git");
    let head = std::fs::read_to_string(git_dir.join("HEAD"))?;

    // either a bare sha or "ref: refs/heads/<branch>"
    let sha = match head.strip_prefix("ref: ") {
        Some(ref_name) => std::fs::read_to_string(git_dir.join(ref_name.trim()))?,
        None => head,
    };

    Ok(sha.trim().to_string())
}

/// First parent of a commit, according to git itself
pub fn get_parent_commit_id(
    dir: &Path,
    commit_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let raw = run_git_command(dir, &["cat-file", "commit", commit_id]).output()?;

    String::from_utf8(raw.stdout)?
        .lines()
        .find_map(|line| line.strip_prefix("parent "))
        .map(str::to_string)
        .ok_or_else(|| format!("commit {commit_id} has no parent").into())
}
