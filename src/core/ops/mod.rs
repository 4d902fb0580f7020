//! core::ops
//!
//! Operation guards.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive lock on one clone
//!
//! # Architecture
//!
//! Scoping and maintainer resolution check out other branches in the
//! clone they run on. Commands that do so:
//! 1. Acquire the clone lock
//! 2. Run the addon operation, which restores the original branch itself
//! 3. Release the lock on drop

pub mod lock;

pub use lock::{CloneLock, LockError};
