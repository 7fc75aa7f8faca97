//! Release command

use clap::Args;
use chrono::NaiveDate;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use chronicle_changelog::{CutOptions, ReleaseBuilder, ReleasePlan, Version, VersionSource};
use chronicle_core::BumpKind;

use crate::cli::output;
use crate::cli::project::Project;
use crate::cli::{Cli, OutputFormat};

/// Cut a release from the staged changes
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Explicit version to release, used as given
    #[arg(long, conflicts_with = "bump")]
    pub version: Option<Version>,

    /// Bump kind (minor, patch); defaults to what the staged changes imply
    #[arg(short, long)]
    pub bump: Option<BumpKind>,

    /// Release date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Dry run - don't make any changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip rendering the changelog
    #[arg(long)]
    pub no_changelog: bool,

    /// Skip rewriting the version marker
    #[arg(long)]
    pub no_marker: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            version = ?self.version,
            bump = ?self.bump,
            date = ?self.date,
            dry_run = self.dry_run,
            no_changelog = self.no_changelog,
            no_marker = self.no_marker,
            "executing release command"
        );
        let project = Project::load(cli)?;

        let mut builder =
            ReleaseBuilder::new(project.store.clone()).with_version_marker(!self.no_marker);
        if !self.no_changelog {
            builder = builder.with_renderer(project.renderer(None));
        }

        let options = CutOptions {
            version: self.version,
            bump: self.bump,
            date: self.date,
        };
        let plan = builder.plan(&options)?;

        if cli.format == OutputFormat::Text && !cli.quiet {
            print_preview(&plan, self.dry_run);
        }

        if self.dry_run {
            if cli.format == OutputFormat::Json {
                output::json(&serde_json::json!({
                    "dry_run": true,
                    "release": plan.release,
                    "staged": plan.staged,
                }))?;
            }
            return Ok(());
        }

        // Confirm release
        if !self.yes && cli.format == OutputFormat::Text && console::user_attended() {
            let confirmed = Confirm::new()
                .with_prompt("Proceed with release?")
                .default(true)
                .interact()?;

            if !confirmed {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let outcome = builder.cut_release(&options)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "dry_run": false,
                "release": outcome.release,
                "release_path": outcome.release_path,
                "changelog_path": outcome.changelog_path,
                "marker_path": outcome.marker_path,
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Released {} to {}",
                        output::version_style().apply_to(outcome.release.version),
                        output::path_style().apply_to(outcome.release_path.display())
                    ));
                    if let Some(path) = &outcome.changelog_path {
                        output::info(&format!("Changelog written to {}", path.display()));
                    } else if !self.no_changelog {
                        output::warning("Changelog could not be written; see logs");
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_preview(plan: &ReleasePlan, dry_run: bool) {
    println!("{}", output::header("Release Preview"));
    println!();
    match &plan.source {
        VersionSource::Explicit => {
            println!("{}", output::key_value("Version source", "explicit"));
        }
        VersionSource::Bumped { base, bump } => {
            println!("{}", output::key_value("Base version", &base.to_string()));
            println!("{}", output::key_value("Bump", bump.as_str()));
        }
    }
    println!(
        "{}",
        output::key_value(
            "Next version",
            &output::version_style()
                .apply_to(plan.release.version)
                .to_string()
        )
    );
    println!("{}", output::key_value("Date", &plan.release.date.to_string()));
    println!(
        "{}",
        output::key_value("Changes", &plan.release.changes.len().to_string())
    );
    println!();

    if dry_run {
        println!("  {}", style("[DRY RUN - no changes will be made]").yellow().bold());
        println!();
    }
}
