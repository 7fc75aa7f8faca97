//! Configuration and store resolution shared by commands

use std::path::PathBuf;

use chronicle_changelog::{ChangeStore, ChangelogRenderer};
use chronicle_core::config::{load_config_or_default, project_root};
use chronicle_core::{ChangesLayout, Config};
use console::style;
use tracing::debug;

use crate::cli::{Cli, OutputFormat};

/// A loaded project: configuration plus the store it points at
pub struct Project {
    /// Loaded or default configuration
    pub config: Config,
    /// Configuration file, if one was found
    pub config_path: Option<PathBuf>,
    /// Change and release store
    pub store: ChangeStore,
}

impl Project {
    /// Load the project containing the current directory
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;

        // Commands may write their result to stdout, so notices go to stderr
        if let Some(notice) = missing_config_notice(cli, config_path.is_some()) {
            eprintln!("{}", notice);
        }

        let root = config_path
            .as_deref()
            .map(project_root)
            .unwrap_or_else(|| cwd.clone());
        let layout = ChangesLayout::new(&root, &config.changes);
        debug!(root = %root.display(), "resolved project layout");

        Ok(Self {
            config,
            config_path,
            store: ChangeStore::new(layout),
        })
    }

    /// Renderer configured for this project
    pub fn renderer(&self, title: Option<&str>) -> ChangelogRenderer {
        ChangelogRenderer::new(title.unwrap_or(&self.config.changes.title))
            .with_wrap_width(self.config.changes.wrap_width)
    }
}

/// Notice shown when running on default configuration
fn missing_config_notice(cli: &Cli, has_config: bool) -> Option<String> {
    if has_config || cli.quiet || cli.format != OutputFormat::Text {
        return None;
    }
    Some(format!(
        "{} No configuration found, using defaults. Run {} to create one.",
        style("!").yellow().bold(),
        style("chronicle init").cyan()
    ))
}
