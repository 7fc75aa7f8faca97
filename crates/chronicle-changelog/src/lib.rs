//! Chronicle Changelog - change staging and release management
//!
//! This crate provides the change and release value model, the on-disk store
//! for staged changes and persisted releases, release cutting, markdown
//! rendering, and pull request annotation of staged changes.

pub mod amend;
pub mod builder;
pub mod render;
pub mod store;
pub mod template;
pub mod types;
pub mod version;

pub use amend::{AmendAction, AmendOptions, AmendReport, AmendWorkflow};
pub use builder::{CutOptions, CutOutcome, ReleaseBuilder, ReleasePlan, VersionSource};
pub use render::ChangelogRenderer;
pub use store::{ChangeStore, ReleaseEntry};
pub use template::{change_template, parse_template};
pub use types::{default_bump, Change, ChangeType, Release};
pub use version::Version;
