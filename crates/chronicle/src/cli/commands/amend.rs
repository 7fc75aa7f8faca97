//! Amend command

use clap::Args;
use tracing::info;

use chronicle_changelog::{AmendAction, AmendOptions, AmendReport, AmendWorkflow};
use chronicle_core::config::Config;
use chronicle_core::error::ConfigError;
use chronicle_core::ChronicleError;
use chronicle_git::GitRepo;
use chronicle_github::{GitHubClient, PostOutcome, PullRequest, RemoteContext};

use crate::cli::output;
use crate::cli::project::Project;
use crate::cli::{Cli, OutputFormat};

/// Attach a pull request reference to newly staged changes
#[derive(Debug, Args)]
pub struct AmendCommand {
    /// Pull request number
    #[arg(long)]
    pub pr: u64,

    /// Repository in `owner/name` form
    #[arg(long)]
    pub repository: Option<String>,

    /// Branch the pull request merges into
    #[arg(long)]
    pub base: Option<String>,

    /// Suggest the reference in a review comment instead of editing files
    #[arg(long)]
    pub review_comment: bool,

    /// Don't add patched files to the git index
    #[arg(long)]
    pub no_stage: bool,
}

impl AmendCommand {
    /// Execute the amend command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            pr = self.pr,
            repository = ?self.repository,
            base = ?self.base,
            review_comment = self.review_comment,
            "executing amend command"
        );
        let project = Project::load(cli)?;
        let config = &project.config;

        let repository = self.resolve_repository(config)?;
        let pull_request = PullRequest::new(&repository, self.pr)?;

        // Credentials are checked before any git or network work
        let client = if self.review_comment {
            let context = RemoteContext::from_env(&config.github)?;
            Some(GitHubClient::new(&config.github, context).map_err(ChronicleError::from)?)
        } else {
            None
        };

        let repo = GitRepo::discover(&project.store.layout().root).map_err(ChronicleError::from)?;
        let mut workflow = AmendWorkflow::new(&project.store, &repo);
        if let Some(client) = &client {
            workflow = workflow.with_client(client);
        }

        let options = AmendOptions {
            pull_request,
            base_branch: self
                .base
                .clone()
                .unwrap_or_else(|| config.amend.base_branch.clone()),
            review_comment: self.review_comment,
            stage: config.amend.stage && !self.no_stage,
        };
        let report = workflow.run(&options)?;

        match cli.format {
            OutputFormat::Json => output::json(&report_json(&report))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
        }
        Ok(())
    }

    /// `--repository`, then config, then the CI environment
    fn resolve_repository(&self, config: &Config) -> Result<String, ChronicleError> {
        if let Some(repository) = &self.repository {
            return Ok(repository.clone());
        }
        if let Some(repository) = &config.github.repository {
            return Ok(repository.clone());
        }
        std::env::var(&config.github.repository_env).map_err(|_| {
            ConfigError::MissingContext(format!(
                "repository (pass --repository or set {})",
                config.github.repository_env
            ))
            .into()
        })
    }
}

fn outcome_label(outcome: &PostOutcome) -> &'static str {
    match outcome {
        PostOutcome::Created { .. } => "posted",
        PostOutcome::Duplicate { .. } => "already posted",
    }
}

fn print_report(report: &AmendReport) {
    for action in &report.actions {
        match action {
            AmendAction::Skipped { path } => output::info(&format!(
                "{} already references a pull request",
                path.display()
            )),
            AmendAction::Patched { path } => output::success(&format!(
                "Added reference to {}",
                output::path_style().apply_to(path.display())
            )),
            AmendAction::Suggested { path, outcome } => output::success(&format!(
                "Suggestion for {} {}",
                output::path_style().apply_to(path.display()),
                outcome_label(outcome)
            )),
        }
    }
    if let Some(outcome) = &report.reminder {
        output::warning(&format!(
            "No staged change found; reminder comment {}",
            outcome_label(outcome)
        ));
    } else if report.actions.is_empty() {
        output::warning("No staged change found in this pull request");
    }
}

fn report_json(report: &AmendReport) -> serde_json::Value {
    let outcome_json = |outcome: &PostOutcome| match outcome {
        PostOutcome::Created { id } => serde_json::json!({"created": true, "id": id}),
        PostOutcome::Duplicate { id } => serde_json::json!({"created": false, "id": id}),
    };
    let actions: Vec<serde_json::Value> = report
        .actions
        .iter()
        .map(|action| match action {
            AmendAction::Skipped { path } => {
                serde_json::json!({"action": "skipped", "path": path})
            }
            AmendAction::Patched { path } => {
                serde_json::json!({"action": "patched", "path": path})
            }
            AmendAction::Suggested { path, outcome } => serde_json::json!({
                "action": "suggested",
                "path": path,
                "comment": outcome_json(outcome),
            }),
        })
        .collect();
    serde_json::json!({
        "actions": actions,
        "reminder": report.reminder.as_ref().map(outcome_json),
    })
}
