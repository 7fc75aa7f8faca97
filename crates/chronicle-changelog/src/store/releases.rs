//! Persisted releases, the version marker and the rendered changelog

use std::path::{Path, PathBuf};

use chronicle_core::error::ChangelogError;
use chronicle_core::Result;
use tracing::{debug, info, instrument};

use super::{has_extension, write_atomic, ChangeStore, LEGACY_EXTENSION, RECORD_EXTENSION};
use crate::types::Release;
use crate::version::Version;

/// A persisted release as found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseEntry {
    /// A structured JSON release
    Structured(Release),
    /// A pre-rendered text block, emitted verbatim
    Legacy {
        /// Version taken from the file name
        version: Version,
        /// File contents
        text: String,
    },
}

impl ReleaseEntry {
    /// Version used for ordering.
    ///
    /// Structured releases are only listed when their body agrees with the
    /// file name, so this is always the file-name version.
    pub fn version(&self) -> Version {
        match self {
            Self::Structured(release) => release.version,
            Self::Legacy { version, .. } => *version,
        }
    }
}

impl ChangeStore {
    /// Paths of all release files with their file-name versions, newest first
    fn release_files(&self) -> Result<Vec<(Version, PathBuf)>> {
        let dir = &self.layout.releases_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(ChangelogError::Io)? {
            let path = entry.map_err(ChangelogError::Io)?.path();
            if !path.is_file() {
                continue;
            }
            if has_extension(&path, RECORD_EXTENSION) || has_extension(&path, LEGACY_EXTENSION) {
                files.push((Version::from_path(&path)?, path));
            }
        }
        files.sort_by(|a, b| b.cmp(a));
        Ok(files)
    }

    /// Every persisted release, newest first
    #[instrument(skip(self), fields(dir = %self.layout.releases_dir.display()))]
    pub fn list_releases(&self) -> Result<Vec<ReleaseEntry>> {
        let mut entries = Vec::new();
        for (version, path) in self.release_files()? {
            let text = std::fs::read_to_string(&path).map_err(ChangelogError::Io)?;
            if has_extension(&path, LEGACY_EXTENSION) {
                entries.push(ReleaseEntry::Legacy { version, text });
            } else {
                entries.push(ReleaseEntry::Structured(parse_release(&path, &text, version)?));
            }
        }
        debug!(count = entries.len(), "listed releases");
        Ok(entries)
    }

    /// Highest persisted release version
    pub fn latest_version(&self) -> Result<Option<Version>> {
        Ok(self.release_files()?.first().map(|(version, _)| *version))
    }

    /// Path of the structured release file for a version
    pub fn release_path(&self, version: &Version) -> PathBuf {
        self.layout
            .releases_dir
            .join(format!("{}.{}", version, RECORD_EXTENSION))
    }

    /// Read one structured release
    pub fn read_release(&self, version: &Version) -> Result<Release> {
        let path = self.release_path(version);
        if !path.exists() {
            return Err(ChangelogError::ReleaseNotFound(version.to_string()).into());
        }
        let text = std::fs::read_to_string(&path).map_err(ChangelogError::Io)?;
        parse_release(&path, &text, *version)
    }

    /// Persist a release, replacing any file for the same version
    #[instrument(skip(self, release), fields(version = %release.version))]
    pub fn write_release(&self, release: &Release) -> Result<PathBuf> {
        let path = self.release_path(&release.version);
        write_atomic(&path, &release.to_json()?)?;
        info!(path = %path.display(), changes = release.changes.len(), "release persisted");
        Ok(path)
    }

    /// Version recorded in the marker file, if configured and present
    pub fn read_version_marker(&self) -> Result<Option<Version>> {
        let Some(marker) = &self.layout.version_marker else {
            return Ok(None);
        };
        if !marker.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(marker).map_err(ChangelogError::Io)?;
        Ok(Some(text.trim().parse()?))
    }

    /// Rewrite the marker file, if configured
    pub fn write_version_marker(&self, version: &Version) -> Result<Option<PathBuf>> {
        let Some(marker) = &self.layout.version_marker else {
            return Ok(None);
        };
        write_atomic(marker, &format!("{}\n", version))?;
        info!(path = %marker.display(), %version, "version marker updated");
        Ok(Some(marker.clone()))
    }

    /// Write the rendered changelog
    pub fn write_changelog(&self, text: &str) -> Result<PathBuf> {
        let path = &self.layout.changelog_file;
        write_atomic(path, text)?;
        info!(path = %path.display(), "changelog written");
        Ok(path.clone())
    }
}

/// Parse a release body, which must carry the version its file is named for
fn parse_release(path: &Path, text: &str, expected: Version) -> Result<Release> {
    let parse_failed = |reason: String| ChangelogError::ParseFailed {
        path: path.to_path_buf(),
        reason,
    };
    let release = Release::from_json(text).map_err(|e| parse_failed(e.to_string()))?;
    if release.version != expected {
        return Err(parse_failed(format!(
            "file is named for {} but records version {}",
            expected, release.version
        ))
        .into());
    }
    Ok(release)
}
