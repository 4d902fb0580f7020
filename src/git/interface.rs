//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to the clone. Every checkout,
//! merge, diff and commit performed by the addon operations flows through
//! [`Git`], which normalizes libgit2 failures into [`GitError`].
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::DetachedHead`]: An operation needed a checked-out branch
//! - [`GitError::MergeConflict`]: A merge could not complete cleanly
//! - [`GitError::CommandFailed`]: Any other failing git operation, carrying
//!   the operation and libgit2's error code
//!
//! # Example
//!
//! ```ignore
//! use addon_steward::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let branch = git.current_branch()?;
//! git.checkout("16.0")?;
//! let changed = git.diff_name_only("16.0", branch.as_str())?;
//! git.checkout(branch.as_str())?;
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::{BranchName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// HEAD does not point at a branch.
    #[error("HEAD is detached, a checked-out branch is required")]
    DetachedHead,

    /// Git operation in progress (rebase, merge, etc.).
    #[error("{operation} in progress")]
    OperationInProgress {
        /// The type of operation in progress
        operation: GitState,
    },

    /// Merge could not complete without conflicts.
    #[error("merging {from} into {into} conflicts on: {}", paths.join(", "))]
    MergeConflict {
        /// Branch being merged into
        into: String,
        /// Ref being merged
        from: String,
        /// Conflicting paths
        paths: Vec<String>,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// A git operation failed.
    #[error("git {operation} failed (code {code}): {message}")]
    CommandFailed {
        /// The operation, with its arguments
        operation: String,
        /// libgit2 error code
        code: i32,
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Wrap a git2 error with the operation that produced it.
    fn command(operation: impl Into<String>, err: git2::Error) -> Self {
        GitError::CommandFailed {
            operation: operation.into(),
            code: err.raw_code(),
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidRefName {
            message: err.to_string(),
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,
    /// Merge in progress.
    Merge,
    /// Rebase in progress.
    Rebase,
    /// Cherry-pick or revert in progress.
    Sequencer,
    /// Bisect or mailbox apply in progress.
    Other,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use addon_steward::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GitState::Clean => "clean",
            GitState::Merge => "merge",
            GitState::Rebase => "rebase",
            GitState::Sequencer => "cherry-pick/revert",
            GitState::Other => "bisect/apply",
        };
        write!(f, "{}", text)
    }
}

/// The Git interface.
///
/// A `Git` is the handle on one physical clone. Its HEAD is the implicit
/// "current ref" every work tree read depends on, so callers that move it
/// must put it back (see [`super::BranchRestore`]).
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// `path` can be any directory within the work tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        Ok(RepoInfo {
            git_dir: self.git_dir().to_path_buf(),
            work_dir: self.work_dir()?.to_path_buf(),
        })
    }

    /// Path to the .git directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Path to the work tree root.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        use git2::RepositoryState as S;
        match self.repo.state() {
            S::Clean => GitState::Clean,
            S::Merge => GitState::Merge,
            S::Rebase | S::RebaseInteractive | S::RebaseMerge => GitState::Rebase,
            S::CherryPick | S::CherryPickSequence | S::Revert | S::RevertSequence => {
                GitState::Sequencer
            }
            S::Bisect | S::ApplyMailbox | S::ApplyMailboxOrRebase => GitState::Other,
        }
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// [`GitError::DetachedHead`] when HEAD is not on a branch.
    pub fn current_branch(&self) -> Result<BranchName, GitError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                // Unborn branch: HEAD is symbolic but has no commit yet
                let head_ref = self
                    .repo
                    .find_reference("HEAD")
                    .map_err(|e| GitError::command("rev-parse HEAD", e))?;
                let target = head_ref.symbolic_target().ok_or(GitError::DetachedHead)?;
                let name = target.strip_prefix("refs/heads/").unwrap_or(target);
                return Ok(BranchName::new(name)?);
            }
            Err(e) => return Err(GitError::command("rev-parse HEAD", e)),
        };

        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }
        let name = head.shorthand().ok_or_else(|| GitError::InvalidRefName {
            message: "HEAD branch name is not valid UTF-8".to_string(),
        })?;
        Ok(BranchName::new(name)?)
    }

    /// Check out `refname`.
    ///
    /// Local branches are checked out attached; any other revision leaves
    /// HEAD detached, as `git checkout` does. When `refname` resolves to
    /// nothing but exactly one remote has a branch of that name, a local
    /// branch tracking it is created first, also like `git checkout`.
    pub fn checkout(&self, refname: &str) -> Result<(), GitError> {
        let operation = format!("checkout {}", refname);
        debug!(refname, "checkout");

        let (object, reference) = match self.resolve(refname) {
            Err(GitError::RefNotFound { .. }) => match self.track_remote_branch(refname)? {
                Some(reference) => {
                    let object = reference
                        .peel(git2::ObjectType::Commit)
                        .map_err(|e| GitError::command(&operation, e))?;
                    (object, Some(reference))
                }
                None => {
                    return Err(GitError::RefNotFound {
                        refname: refname.to_string(),
                    })
                }
            },
            other => other?,
        };
        self.repo
            .checkout_tree(&object, Some(CheckoutBuilder::new().safe()))
            .map_err(|e| GitError::command(&operation, e))?;

        let moved = match reference.as_ref().and_then(|r| r.name()) {
            Some(name) if name.starts_with("refs/heads/") => self.repo.set_head(name),
            _ => self.repo.set_head_detached(object.id()),
        };
        moved.map_err(|e| GitError::command(&operation, e))
    }

    /// Create (or reset) branch `name` at `from` and check it out.
    ///
    /// Equivalent to `git checkout -B <name> <from>`.
    pub fn checkout_new_branch(&self, name: &BranchName, from: &str) -> Result<(), GitError> {
        let operation = format!("checkout -B {} {}", name, from);
        debug!(branch = %name, from, "checkout new branch");

        let (object, _) = self.resolve(from)?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::command(&operation, e))?;
        self.repo
            .branch(name.as_str(), &commit, true)
            .map_err(|e| GitError::command(&operation, e))?;
        self.checkout(name.as_str())
    }

    // =========================================================================
    // Merge
    // =========================================================================

    /// Merge `refname` into the checked-out branch.
    ///
    /// Fast-forwards when possible, otherwise records a merge commit. A
    /// conflicting merge leaves the work tree and HEAD untouched and
    /// returns [`GitError::MergeConflict`].
    pub fn merge(&self, refname: &str) -> Result<(), GitError> {
        let operation = format!("merge {}", refname);
        let into = self.current_branch()?;
        debug!(from = refname, into = %into, "merge");

        let (object, _) = self.resolve(refname)?;
        let theirs = object
            .peel_to_commit()
            .map_err(|e| GitError::command(&operation, e))?;
        let ours = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::command(&operation, e))?;

        let annotated = self
            .repo
            .find_annotated_commit(theirs.id())
            .map_err(|e| GitError::command(&operation, e))?;
        let (analysis, _) = self
            .repo
            .merge_analysis(&[&annotated])
            .map_err(|e| GitError::command(&operation, e))?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_fast_forward() {
            self.repo
                .checkout_tree(theirs.as_object(), Some(CheckoutBuilder::new().safe()))
                .map_err(|e| GitError::command(&operation, e))?;
            let mut head = self
                .repo
                .find_reference(&format!("refs/heads/{}", into))
                .map_err(|e| GitError::command(&operation, e))?;
            head.set_target(theirs.id(), &format!("merge {}: Fast-forward", refname))
                .map_err(|e| GitError::command(&operation, e))?;
            return Ok(());
        }

        let mut index = self
            .repo
            .merge_commits(&ours, &theirs, None)
            .map_err(|e| GitError::command(&operation, e))?;

        if index.has_conflicts() {
            let mut paths = Vec::new();
            for conflict in index
                .conflicts()
                .map_err(|e| GitError::command(&operation, e))?
                .flatten()
            {
                if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                    paths.push(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
            return Err(GitError::MergeConflict {
                into: into.to_string(),
                from: refname.to_string(),
                paths,
            });
        }

        let tree_id = index
            .write_tree_to(&self.repo)
            .map_err(|e| GitError::command(&operation, e))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::command(&operation, e))?;

        self.repo
            .checkout_tree(tree.as_object(), Some(CheckoutBuilder::new().safe()))
            .map_err(|e| GitError::command(&operation, e))?;

        let signature = self.signature()?;
        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &format!("Merge branch '{}' into {}", refname, into),
                &tree,
                &[&ours, &theirs],
            )
            .map_err(|e| GitError::command(&operation, e))?;
        Ok(())
    }

    // =========================================================================
    // Diff
    // =========================================================================

    /// Paths that differ between two revisions, like `git diff --name-only a b`.
    ///
    /// Renames are detected, so a moved file is reported once under its new
    /// path. Paths use `/` separators and are relative to the work tree root.
    pub fn diff_name_only(&self, from: &str, to: &str) -> Result<Vec<String>, GitError> {
        let operation = format!("diff --name-only {} {}", from, to);

        let old_tree = self
            .resolve(from)?
            .0
            .peel_to_tree()
            .map_err(|e| GitError::command(&operation, e))?;
        let new_tree = self
            .resolve(to)?
            .0
            .peel_to_tree()
            .map_err(|e| GitError::command(&operation, e))?;

        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .map_err(|e| GitError::command(&operation, e))?;
        diff.find_similar(Some(git2::DiffFindOptions::new().renames(true)))
            .map_err(|e| GitError::command(&operation, e))?;

        let mut paths: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for delta in diff.deltas() {
            let file = if delta.new_file().path_bytes().is_some() {
                delta.new_file()
            } else {
                delta.old_file()
            };
            if let Some(bytes) = file.path_bytes() {
                let path = String::from_utf8_lossy(bytes).into_owned();
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Stage `paths` (relative to the work tree) and commit on HEAD.
    ///
    /// Returns the new commit id.
    pub fn commit(&self, message: &str, paths: &[&Path]) -> Result<String, GitError> {
        let operation = format!("commit -m {:?}", message);
        let work_dir = self.work_dir()?;

        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::command(&operation, e))?;
        for path in paths {
            let relative = path.strip_prefix(work_dir).unwrap_or(path);
            let staged = if work_dir.join(relative).exists() {
                index.add_path(relative)
            } else {
                index.remove_path(relative)
            };
            staged.map_err(|e| GitError::command(format!("add {}", relative.display()), e))?;
        }
        index.write().map_err(|e| GitError::command(&operation, e))?;

        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::command(&operation, e))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::command(&operation, e))?;
        let parent = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map_err(|e| GitError::command(&operation, e))?;

        let signature = self.signature()?;
        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&parent],
            )
            .map_err(|e| GitError::command(&operation, e))?;
        debug!(commit = %oid, "committed");
        Ok(oid.to_string())
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    /// URL of remote `name`, if that remote exists.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::command(format!("remote get-url {}", name), e)),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Resolve a revision, preferring a local branch of that exact name.
    fn resolve(&self, refname: &str) -> Result<(git2::Object<'_>, Option<git2::Reference<'_>>), GitError> {
        if let Ok(branch) = self.repo.find_branch(refname, git2::BranchType::Local) {
            let reference = branch.into_reference();
            let object = reference
                .peel(git2::ObjectType::Commit)
                .map_err(|e| GitError::command(format!("rev-parse {}", refname), e))?;
            return Ok((object, Some(reference)));
        }

        self.repo.revparse_ext(refname).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => GitError::RefNotFound {
                refname: refname.to_string(),
            },
            _ => GitError::command(format!("rev-parse {}", refname), e),
        })
    }

    /// Create local branch `name` tracking `<remote>/name`, if exactly one
    /// remote has such a branch.
    fn track_remote_branch(&self, name: &str) -> Result<Option<git2::Reference<'_>>, GitError> {
        let operation = format!("checkout --track {}", name);
        let remotes = self
            .repo
            .remotes()
            .map_err(|e| GitError::command(&operation, e))?;

        let mut matches = Vec::new();
        for remote in remotes.iter().flatten() {
            let refname = format!("refs/remotes/{}/{}", remote, name);
            if let Ok(reference) = self.repo.find_reference(&refname) {
                matches.push((remote.to_string(), reference));
            }
        }

        if matches.len() != 1 {
            if matches.len() > 1 {
                debug!(name, remotes = matches.len(), "remote branch is ambiguous");
            }
            return Ok(None);
        }
        let Some((remote, reference)) = matches.pop() else {
            return Ok(None);
        };

        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::command(&operation, e))?;
        let mut branch = self
            .repo
            .branch(name, &commit, false)
            .map_err(|e| GitError::command(&operation, e))?;
        let upstream = format!("{}/{}", remote, name);
        branch
            .set_upstream(Some(upstream.as_str()))
            .map_err(|e| GitError::command(&operation, e))?;
        info!(branch = name, upstream = %upstream, "created tracking branch");
        Ok(Some(branch.into_reference()))
    }

    /// Committer identity from git config, or a fixed bot identity.
    fn signature(&self) -> Result<git2::Signature<'static>, GitError> {
        self.repo
            .signature()
            .or_else(|_| git2::Signature::now("addon-steward", "addon-steward@localhost"))
            .map_err(|e| GitError::command("signature", e))
    }
}
