//! Bookshelf application library
//!
//! The books module (record model, store gateway, handlers, views, seed data)
//! plus the bootstrap shared by the `bookshelf` binary and `bookshelf-cli`.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
