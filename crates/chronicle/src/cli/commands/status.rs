//! Status command

use clap::Args;
use console::style;
use tracing::info;

use chronicle_changelog::{default_bump, Change, ChangeType, CutOptions, ReleaseBuilder};
use chronicle_core::error::WorkflowError;
use chronicle_core::ChronicleError;

use crate::cli::output;
use crate::cli::project::Project;
use crate::cli::{Cli, OutputFormat};

/// Show staged changes and the next release version
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing status command");
        let project = Project::load(cli)?;
        let store = &project.store;

        let staged = store.list_staged()?;
        let latest = store.latest_version()?;
        let bump = (!staged.is_empty()).then(|| default_bump(staged.iter().map(|(_, c)| c)));

        // Same resolution a release cut would perform, without writing
        let next_version = match ReleaseBuilder::new(store.clone()).plan(&CutOptions::default()) {
            Ok(plan) => Some(plan.release.version),
            Err(ChronicleError::Workflow(
                WorkflowError::NoStagedChanges | WorkflowError::NoBaseVersion,
            )) => None,
            Err(e) => return Err(e.into()),
        };

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "config_path": project.config_path,
                "latest_release": latest,
                "next_version": next_version,
                "bump": bump,
                "staged": staged
                    .iter()
                    .map(|(path, change)| serde_json::json!({"path": path, "change": change}))
                    .collect::<Vec<_>>(),
            }))?,
            OutputFormat::Text => {
                println!("{}", output::header("Chronicle Status"));
                println!();
                match &project.config_path {
                    Some(path) => println!("{}", output::key_value("Config file", &path.display().to_string())),
                    None => println!(
                        "{}",
                        output::key_value("Config file", &style("not found (using defaults)").yellow().to_string())
                    ),
                }
                println!(
                    "{}",
                    output::key_value(
                        "Latest release",
                        &latest.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
                    )
                );
                if let (Some(bump), Some(next)) = (bump, next_version) {
                    println!(
                        "{}",
                        output::key_value(
                            "Next release",
                            &format!("{} ({} bump)", output::version_style().apply_to(next), bump)
                        )
                    );
                } else if bump.is_some() {
                    println!(
                        "{}",
                        output::key_value("Next release", "no base version; pass --version to release")
                    );
                }
                println!();

                if staged.is_empty() {
                    println!("{}", style("No staged changes.").dim());
                    return Ok(());
                }

                let changes: Vec<&Change> = staged.iter().map(|(_, c)| c).collect();
                for change_type in ChangeType::all() {
                    let group: Vec<&&Change> = changes
                        .iter()
                        .filter(|c| c.change_type == change_type)
                        .collect();
                    if group.is_empty() {
                        continue;
                    }
                    println!("{}", style(change_type.section_title()).underlined());
                    for change in group {
                        let first_line = change.description.trim().lines().next().unwrap_or_default();
                        println!("  * {}", first_line);
                    }
                    println!();
                }
            }
        }

        Ok(())
    }
}
