//! New change command

use clap::Args;
use dialoguer::Editor;
use tracing::info;

use chronicle_changelog::{change_template, parse_template, Change, ChangeType};
use chronicle_core::error::{ChangelogError, WorkflowError};
use chronicle_core::ChronicleError;

use crate::cli::output;
use crate::cli::project::Project;
use crate::cli::{Cli, OutputFormat};

/// Stage a new change for the next release
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Change type (breaking, feature, bugfix, documentation, other)
    #[arg(short = 't', long = "type", value_parser = parse_change_type)]
    pub change_type: Option<ChangeType>,

    /// Change description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Pull request reference (repeatable)
    #[arg(short = 'p', long = "pull-request")]
    pub pull_requests: Vec<String>,
}

fn parse_change_type(value: &str) -> Result<ChangeType, String> {
    value.parse().map_err(|e: ChangelogError| e.to_string())
}

impl NewCommand {
    /// Execute the new command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(change_type = ?self.change_type, "executing new command");
        let project = Project::load(cli)?;

        let change = match (self.change_type, &self.description) {
            (Some(change_type), Some(description)) => Change::new(change_type, description.as_str())
                .map_err(ChronicleError::from)?
                .with_pull_requests(self.pull_requests.clone()),
            _ => self.edit()?,
        };

        let path = project.store.write_staged(&change)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "path": path,
                "change": change,
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Staged {} change at {}",
                        change.change_type,
                        output::path_style().apply_to(path.display())
                    ));
                }
            }
        }

        Ok(())
    }

    /// Fill the missing fields in an editor
    fn edit(&self) -> anyhow::Result<Change> {
        let template = change_template(
            self.change_type,
            self.description.as_deref(),
            &self.pull_requests,
        );
        let edited = Editor::new()
            .extension(".txt")
            .edit(&template)?
            .ok_or(ChronicleError::from(WorkflowError::Cancelled))?;

        match parse_template(&edited) {
            Some(change) => Ok(change),
            None => {
                output::warning("No valid type or an empty description; nothing staged.");
                Err(ChronicleError::from(WorkflowError::Cancelled).into())
            }
        }
    }
}
