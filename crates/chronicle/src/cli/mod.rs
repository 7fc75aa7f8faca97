//! CLI definition and command handling

pub mod commands;
pub mod output;
pub mod project;

use clap::{Parser, Subcommand};

use commands::{
    AmendCommand, CompletionsCommand, InitCommand, NewCommand, ReleaseCommand, RenderCommand,
    StatusCommand,
};

/// Chronicle - changelog release management
#[derive(Debug, Parser)]
#[command(name = "chronicle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a new Chronicle configuration
    Init(InitCommand),

    /// Stage a new change for the next release
    New(NewCommand),

    /// Cut a release from the staged changes
    #[command(disable_version_flag = true)]
    Release(ReleaseCommand),

    /// Render the changelog from persisted releases
    Render(RenderCommand),

    /// Attach a pull request reference to newly staged changes
    Amend(AmendCommand),

    /// Show staged changes and the next release version
    Status(StatusCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::New(ref cmd) => cmd.execute(&self),
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Render(ref cmd) => cmd.execute(&self),
            Commands::Amend(ref cmd) => cmd.execute(&self),
            Commands::Status(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}
