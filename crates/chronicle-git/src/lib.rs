//! Chronicle Git - Git operations for changelog release management
//!
//! This crate provides the read-only diff queries and index staging used to
//! annotate change files introduced by a pull request.

mod diff;
mod index;
mod repository;

pub use repository::{GitRepo, Result};
