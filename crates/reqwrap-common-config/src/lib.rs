//! Configuration for reqwrap.
//!
//! Provides the process-wide environment configuration consulted by the
//! request executor: one base URL per [`Server`], the default server signal,
//! transport settings loaded from an optional `reqwrap.yaml`, and the
//! persistent token storage.

pub mod env;
pub mod loader;
pub mod token;
pub mod types;

pub use env::*;
pub use loader::*;
pub use token::*;
pub use types::*;
