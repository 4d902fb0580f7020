//! Addon steward - change scoping and maintainer tooling for addon repositories
//!
//! An addon repository holds many independently versioned addons, one per
//! top-level directory, each described by a descriptor file. This crate
//! answers the questions a pull request bot asks before acting: which
//! addons does this change touch, who maintains them, and may this user
//! merge it.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to addons)
//! - [`addons`] - Descriptors, change scoping, maintainers, authorization
//! - [`core`] - Domain types, version codec, configuration, clone lock
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - Abstraction for the hosting platform (GitHub)
//! - [`telemetry`] - Tracing subscriber setup
//!
//! # Invariants
//!
//! 1. Every operation that moves HEAD checks the original branch out again,
//!    also when it fails
//! 2. Descriptors are read from the work tree on every query, never cached
//! 3. Descriptor content is parsed as a literal, never executed

pub mod addons;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
pub mod telemetry;
