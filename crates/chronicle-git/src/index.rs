//! Index (staging area) operations

use std::path::Path;

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Add a file to the index, like `git add <path>`
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn stage_path(&self, path: &Path) -> Result<()> {
        let relative = self.relative_to_workdir(path)?;
        let mut index = self.repo.index()?;
        index.add_path(&relative)?;
        index.write()?;
        info!(path = %relative.display(), "staged file in git index");
        Ok(())
    }

    /// Whether a path is present in the index
    pub fn is_staged(&self, path: &Path) -> Result<bool> {
        let relative = self.relative_to_workdir(path)?;
        let index = self.repo.index()?;
        Ok(index.get_path(&relative, 0).is_some())
    }
}
