//! On-disk storage for staged changes and persisted releases
//!
//! Staged changes live one per file in the next-release directory; releases
//! live one per file in the releases directory, named after their version.
//! Every write replaces the whole file through a temporary sibling, so a
//! crash never leaves a half-written record behind.

mod releases;
mod staging;

use std::io::Write;
use std::path::Path;

use chronicle_core::error::ChangelogError;
use chronicle_core::ChangesLayout;
use tempfile::NamedTempFile;

pub use releases::ReleaseEntry;

/// File extension of staged changes and structured releases
pub const RECORD_EXTENSION: &str = "json";

/// File extension of pre-rendered legacy releases
pub const LEGACY_EXTENSION: &str = "md";

/// Filesystem store rooted at a [`ChangesLayout`]
#[derive(Debug, Clone)]
pub struct ChangeStore {
    layout: ChangesLayout,
}

impl ChangeStore {
    /// Create a store over the given layout
    pub fn new(layout: ChangesLayout) -> Self {
        Self { layout }
    }

    /// Resolved locations
    pub fn layout(&self) -> &ChangesLayout {
        &self.layout
    }
}

/// Replace `path` with `contents` via a temporary file in the same directory
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ChangelogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.persist(path).map_err(|e| ChangelogError::Io(e.error))?;
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents_and_replaces() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/record.json");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(temp.path().join("a/b")).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
