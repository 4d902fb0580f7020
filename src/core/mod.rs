//! core
//!
//! Core domain types, schemas, and operations.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, AddonName
//! - [`version`] - Addon versions, release series, bumps
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Clone locking
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod ops;
pub mod types;
pub mod version;
