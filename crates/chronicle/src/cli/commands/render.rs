//! Render command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::cli::output;
use crate::cli::project::Project;
use crate::cli::Cli;

/// Render the changelog from persisted releases
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Changelog title, overriding the configured one
    #[arg(long)]
    pub title: Option<String>,

    /// Output file, overriding the configured changelog file
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

impl RenderCommand {
    /// Execute the render command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(title = ?self.title, output = ?self.output, "executing render command");
        let project = Project::load(cli)?;
        let text = project
            .renderer(self.title.as_deref())
            .render_store(&project.store)?;

        if self.stdout {
            print!("{}", text);
            return Ok(());
        }

        let path = match &self.output {
            Some(path) => {
                std::fs::write(path, &text)?;
                path.clone()
            }
            None => project.store.write_changelog(&text)?,
        };

        if !cli.quiet {
            output::success(&format!(
                "Changelog written to {}",
                output::path_style().apply_to(path.display())
            ));
        }
        Ok(())
    }
}
