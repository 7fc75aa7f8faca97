//! Chronicle Core - Core library for changelog release management
//!
//! This crate provides the foundational error types, configuration and
//! shared enums used by the other Chronicle crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChangesLayout, Config};
pub use error::{ChronicleError, Result};
pub use types::BumpKind;
