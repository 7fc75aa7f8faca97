//! Read-only diff queries against a base branch

use std::path::PathBuf;

use git2::{Delta, Oid};
use tracing::{debug, instrument};

use chronicle_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Resolve a branch or revision, falling back to its `origin/` counterpart
    pub fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        let candidates = [revision.to_string(), format!("origin/{}", revision)];
        for candidate in &candidates {
            if let Ok(object) = self.repo.revparse_single(candidate) {
                let commit = object.peel_to_commit()?;
                debug!(revision = %candidate, oid = %commit.id(), "resolved revision");
                return Ok(commit.id());
            }
        }
        Err(GitError::UnknownRevision(revision.to_string()))
    }

    /// Files added on HEAD since it diverged from `base`.
    ///
    /// Equivalent to `git diff --name-only --diff-filter=A base...HEAD`.
    /// Paths are relative to the repository root.
    #[instrument(skip(self))]
    pub fn added_files_since(&self, base: &str) -> Result<Vec<PathBuf>> {
        let base_oid = self.resolve_commit(base)?;
        let head = self.head_commit()?;
        let merge_base = self.repo.merge_base(base_oid, head.id())?;

        let old_tree = self.repo.find_commit(merge_base)?.tree()?;
        let new_tree = head.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let files: Vec<PathBuf> = diff
            .deltas()
            .filter(|delta| delta.status() == Delta::Added)
            .filter_map(|delta| delta.new_file().path().map(PathBuf::from))
            .collect();

        debug!(base, count = files.len(), "collected added files");
        Ok(files)
    }
}
