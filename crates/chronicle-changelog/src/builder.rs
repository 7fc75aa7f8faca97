//! Release cutting
//!
//! Aggregates every staged change into one persisted release. The release
//! file is written before any staged file is removed, so an interrupted cut
//! can be re-run without losing entries.
//!
//! Cuts are single-writer: no locking is performed on the staging or release
//! directories, and two concurrent cuts against the same tree may both see
//! the same staged set or overwrite each other's release file.

use std::path::PathBuf;

use chrono::NaiveDate;
use chronicle_core::error::WorkflowError;
use chronicle_core::{BumpKind, Result};
use tracing::{debug, info, instrument, warn};

use crate::render::ChangelogRenderer;
use crate::store::ChangeStore;
use crate::types::{default_bump, Release};
use crate::version::Version;

/// Options for a release cut
#[derive(Debug, Clone, Default)]
pub struct CutOptions {
    /// Explicit version, used verbatim
    pub version: Option<Version>,
    /// Bump kind, overriding the one implied by the staged changes
    pub bump: Option<BumpKind>,
    /// Release date, defaulting to today
    pub date: Option<NaiveDate>,
}

impl CutOptions {
    /// Set an explicit version
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the bump kind
    pub fn with_bump(mut self, bump: BumpKind) -> Self {
        self.bump = Some(bump);
        self
    }

    /// Set the release date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Where the version of a planned release came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Supplied by the caller
    Explicit,
    /// Bumped from a base version
    Bumped {
        /// Version the bump was applied to
        base: Version,
        /// Bump applied
        bump: BumpKind,
    },
}

/// A fully resolved release that has not been written yet
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    /// The release to persist
    pub release: Release,
    /// Staged files the release consumes
    pub staged: Vec<PathBuf>,
    /// How the version was resolved
    pub source: VersionSource,
}

/// Result of a completed cut
#[derive(Debug, Clone)]
pub struct CutOutcome {
    /// The persisted release
    pub release: Release,
    /// Release file
    pub release_path: PathBuf,
    /// Rendered changelog, if written
    pub changelog_path: Option<PathBuf>,
    /// Version marker, if rewritten
    pub marker_path: Option<PathBuf>,
}

/// Cuts releases from a [`ChangeStore`]
pub struct ReleaseBuilder {
    store: ChangeStore,
    renderer: Option<ChangelogRenderer>,
    update_marker: bool,
}

impl ReleaseBuilder {
    /// Create a builder that only persists the release
    pub fn new(store: ChangeStore) -> Self {
        Self {
            store,
            renderer: None,
            update_marker: false,
        }
    }

    /// Re-render the changelog after each cut
    pub fn with_renderer(mut self, renderer: ChangelogRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Rewrite the version marker after each cut
    pub fn with_version_marker(mut self, enabled: bool) -> Self {
        self.update_marker = enabled;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &ChangeStore {
        &self.store
    }

    /// Resolve the next release without writing anything
    #[instrument(skip(self, options))]
    pub fn plan(&self, options: &CutOptions) -> Result<ReleasePlan> {
        let staged = self.store.list_staged()?;
        if staged.is_empty() {
            return Err(WorkflowError::NoStagedChanges.into());
        }

        let (version, source) = match options.version {
            Some(version) => {
                if let Some(latest) = self.store.latest_version()? {
                    if version <= latest {
                        warn!(%version, %latest, "explicit version is not newer than the latest release");
                    }
                }
                (version, VersionSource::Explicit)
            }
            None => {
                let bump = options
                    .bump
                    .unwrap_or_else(|| default_bump(staged.iter().map(|(_, c)| c)));
                let base = self.base_version()?;
                (base.bump(bump), VersionSource::Bumped { base, bump })
            }
        };

        let (paths, changes): (Vec<PathBuf>, Vec<_>) = staged.into_iter().unzip();
        let mut release = Release::new(version, changes);
        if let Some(date) = options.date {
            release = release.with_date(date);
        }

        debug!(version = %release.version, changes = release.changes.len(), ?source, "release planned");
        Ok(ReleasePlan {
            release,
            staged: paths,
            source,
        })
    }

    /// Version marker contents, or else the highest persisted release
    pub fn base_version(&self) -> Result<Version> {
        if let Some(version) = self.store.read_version_marker()? {
            debug!(%version, "base version from marker");
            return Ok(version);
        }
        match self.store.latest_version()? {
            Some(version) => {
                debug!(%version, "base version from latest release");
                Ok(version)
            }
            None => Err(WorkflowError::NoBaseVersion.into()),
        }
    }

    /// Cut a release from everything staged
    #[instrument(skip(self, options))]
    pub fn cut_release(&self, options: &CutOptions) -> Result<CutOutcome> {
        let plan = self.plan(options)?;
        let release_path = self.store.write_release(&plan.release)?;

        for path in &plan.staged {
            self.store.delete_staged(path)?;
        }

        let changelog_path = self.render_changelog();
        let marker_path = self.update_marker(&plan.release.version);

        info!(
            version = %plan.release.version,
            changes = plan.release.changes.len(),
            "release cut"
        );
        Ok(CutOutcome {
            release: plan.release,
            release_path,
            changelog_path,
            marker_path,
        })
    }

    fn render_changelog(&self) -> Option<PathBuf> {
        let renderer = self.renderer.as_ref()?;
        let result = renderer
            .render_store(&self.store)
            .and_then(|text| self.store.write_changelog(&text));
        match result {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "failed to write rendered changelog");
                None
            }
        }
    }

    fn update_marker(&self, version: &Version) -> Option<PathBuf> {
        if !self.update_marker {
            return None;
        }
        match self.store.write_version_marker(version) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "failed to update version marker");
                None
            }
        }
    }
}
