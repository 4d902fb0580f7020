//! core::ops::lock
//!
//! Exclusive lock on one physical clone.
//!
//! # Architecture
//!
//! Scoping a change and resolving maintainers both move the clone's HEAD
//! around and read files from the work tree. Two such operations on the
//! same clone would read each other's checkouts, so callers that may run
//! concurrently (two webhooks for the same repository) hold a `CloneLock`
//! for the whole "checkout, read, checkout back" span.
//!
//! # Storage
//!
//! - `<git_dir>/addon-steward/lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is automatically released on drop (RAII pattern)
//! - [`CloneLock::acquire`] fails fast, [`CloneLock::acquire_blocking`] waits
//!
//! # Example
//!
//! ```ignore
//! use addon_steward::core::ops::lock::CloneLock;
//!
//! let lock = CloneLock::acquire(git.git_dir())?;
//! let scope = addons::scope::modified_addons(&git, &target)?;
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Directory under the git dir holding this crate's state.
const STATE_DIR: &str = "addon-steward";

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("clone is locked by another operation")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on a clone.
///
/// Released when dropped, even if the guarded operation panics.
#[derive(Debug)]
pub struct CloneLock {
    path: PathBuf,
    /// Open handle holding the lock; `None` once released.
    file: Option<File>,
}

impl CloneLock {
    /// Path of the lock file for a git directory.
    pub fn lock_path(git_dir: &Path) -> PathBuf {
        git_dir.join(STATE_DIR).join("lock")
    }

    /// Attempt to acquire the lock without waiting.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another holder exists
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(git_dir: &Path) -> Result<Self, LockError> {
        let (path, file) = Self::open(git_dir)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Acquire the lock, waiting for the current holder to release it.
    pub fn acquire_blocking(git_dir: &Path) -> Result<Self, LockError> {
        let (path, file) = Self::open(git_dir)?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Try to acquire the lock, returning `None` if already held.
    pub fn try_acquire(git_dir: &Path) -> Result<Option<Self>, LockError> {
        match Self::acquire(git_dir) {
            Ok(lock) => Ok(Some(lock)),
            Err(LockError::AlreadyLocked) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn open(git_dir: &Path) -> Result<(PathBuf, File), LockError> {
        let state_dir = git_dir.join(STATE_DIR);
        fs::create_dir_all(&state_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", state_dir.display(), e))
        })?;

        let path = Self::lock_path(git_dir);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;
        Ok((path, file))
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard goes out of scope.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for CloneLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
