//! Shared fixture for integration tests.
//!
//! Builds real repositories in temp directories by shelling out to git.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use addon_steward::git::Git;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a repository whose first branch is `branch`, with an initial commit.
    pub fn new(branch: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);

        let repo = Self { dir };
        repo.write("README.md", "# Addons\n");
        repo.commit_all("Initial commit");
        repo
    }

    /// Clone `upstream` into a new temp dir. Only the branch checked out in
    /// `upstream` becomes local; the others exist as `origin/*`.
    pub fn clone_of(upstream: &TestRepo) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let source = upstream.path().to_str().expect("temp path is UTF-8");
        let target = dir.path().to_str().expect("temp path is UTF-8");

        run_git(upstream.path(), &["clone", "--quiet", source, target]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);

        Self { dir }
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    pub fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    /// Write an addon descriptor under `dir` (relative to the root).
    pub fn addon(&self, dir: &str, version: &str, maintainers: &[&str]) -> PathBuf {
        let list: Vec<String> = maintainers.iter().map(|m| format!("'{}'", m)).collect();
        self.write(
            &format!("{}/__manifest__.py", dir),
            &format!(
                "{{\n    'name': '{}',\n    'version': '{}',\n    'maintainers': [{}],\n}}\n",
                dir,
                version,
                list.join(", ")
            ),
        );
        self.path().join(dir)
    }

    /// Stage everything and commit.
    pub fn commit_all(&self, message: &str) {
        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "-m", message]);
    }

    /// Create a branch at HEAD and check it out.
    pub fn branch(&self, name: &str) {
        run_git(self.path(), &["checkout", "-b", name]);
    }

    /// Checkout a branch.
    pub fn checkout(&self, name: &str) {
        run_git(self.path(), &["checkout", name]);
    }

    /// Name of the checked-out branch, via git itself.
    pub fn current_branch(&self) -> String {
        git_output(self.path(), &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// `git status --porcelain` output.
    pub fn status(&self) -> String {
        git_output(self.path(), &["status", "--porcelain"])
    }

    /// Output of an arbitrary git command.
    pub fn output(&self, args: &[&str]) -> String {
        git_output(self.path(), args)
    }
}

/// Run a git command in the given directory.
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}
