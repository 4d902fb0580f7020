//! forge
//!
//! Abstraction for the hosting platform (GitHub).
//!
//! # Architecture
//!
//! The `Forge` trait defines the interface the addon workflows need from
//! the platform. Commands use the [`create_forge`] factory function
//! rather than constructing a specific implementation.
//!
//! Forge operations never touch the clone; a forge failure leaves local
//! state as it was.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Forge creation from configuration

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::create_forge;
pub use traits::*;
