//! Shell completions command

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::Cli;

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "executing completions command");
        let script = self.script();

        match &self.output {
            Some(path) => {
                std::fs::write(path, &script)?;
                if !cli.quiet {
                    println!("Completions written to {}", path.display());
                }
            }
            None => std::io::stdout().write_all(&script)?,
        }
        Ok(())
    }

    fn script(&self) -> Vec<u8> {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        let mut buffer = Vec::new();
        generate(self.shell, &mut cmd, name, &mut buffer);
        buffer
    }
}
