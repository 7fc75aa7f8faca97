//! Staged change files

use std::path::{Path, PathBuf};

use chronicle_core::error::ChangelogError;
use chronicle_core::Result;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use super::{has_extension, write_atomic, ChangeStore, RECORD_EXTENSION};
use crate::types::Change;

/// Hex characters of the content hash kept in a staged file name
const HASH_PREFIX_LEN: usize = 16;

impl ChangeStore {
    /// Every staged change, sorted by file name.
    ///
    /// A single unparseable file fails the whole listing, naming that file.
    #[instrument(skip(self), fields(dir = %self.layout.next_release_dir.display()))]
    pub fn list_staged(&self) -> Result<Vec<(PathBuf, Change)>> {
        let dir = &self.layout.next_release_dir;
        if !dir.exists() {
            debug!("staging directory does not exist");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(ChangelogError::Io)? {
            let path = entry.map_err(ChangelogError::Io)?.path();
            if path.is_file() && has_extension(&path, RECORD_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut staged = Vec::with_capacity(paths.len());
        for path in paths {
            let change = self.read_staged(&path)?;
            staged.push((path, change));
        }

        debug!(count = staged.len(), "listed staged changes");
        Ok(staged)
    }

    /// Read one staged change
    pub fn read_staged(&self, path: &Path) -> Result<Change> {
        let text = std::fs::read_to_string(path).map_err(ChangelogError::Io)?;
        Change::from_json(&text).map_err(|e| {
            ChangelogError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Write a new staged change and return its path.
    ///
    /// The name is derived from a hash of the serialized change, so identical
    /// submissions map to the same file.
    #[instrument(skip(self, change), fields(change_type = %change.change_type))]
    pub fn write_staged(&self, change: &Change) -> Result<PathBuf> {
        let contents = change.to_json()?;
        let path = self
            .layout
            .next_release_dir
            .join(staged_file_name(change, &contents));
        write_atomic(&path, &contents)?;
        info!(path = %path.display(), "staged change written");
        Ok(path)
    }

    /// Remove a staged change; a missing file is not an error
    pub fn delete_staged(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "staged change deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "staged change already gone");
                Ok(())
            }
            Err(e) => Err(ChangelogError::Io(e).into()),
        }
    }

    /// Overwrite a staged change in place
    #[instrument(skip(self, change), fields(path = %path.display()))]
    pub fn patch_staged(&self, path: &Path, change: &Change) -> Result<()> {
        let contents = change.to_json()?;
        write_atomic(path, &contents)?;
        info!("staged change patched");
        Ok(())
    }
}

fn staged_file_name(change: &Change, contents: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(contents.as_bytes()));
    format!(
        "{}-{}.{}",
        change.change_type,
        &digest[..HASH_PREFIX_LEN],
        RECORD_EXTENSION
    )
}
