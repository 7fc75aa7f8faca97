//! Init command

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use dialoguer::Confirm;
use tracing::info;

use chronicle_core::config::{
    default_config_toml, project_root, Config, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML,
};
use chronicle_core::ChangesLayout;

use crate::cli::Cli;

/// Initialize a new Chronicle configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Configuration file format
    #[arg(long, value_enum, default_value = "toml")]
    pub config_format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// YAML
    Yaml,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, format = ?self.config_format, "executing init command");
        let cwd = std::env::current_dir()?;
        let default_name = match self.config_format {
            ConfigFormat::Toml => DEFAULT_CONFIG_TOML,
            ConfigFormat::Yaml => DEFAULT_CONFIG_YAML,
        };
        let config_path = match &self.output {
            Some(path) => cwd.join(path),
            None => cwd.join(default_name),
        };

        // Check if config already exists
        if config_path.exists() && !self.force {
            if self.yes || !console::user_attended() {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let content = match self.config_format {
            ConfigFormat::Toml => default_config_toml(),
            ConfigFormat::Yaml => serde_yaml::to_string(&Config::default())?,
        };
        std::fs::write(&config_path, &content)?;

        create_store_dirs(&config_path)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to customize where changes are kept", config_path.display());
            println!("  2. Run {} to stage your first change", style("chronicle new").cyan());
            println!("  3. Run {} to cut a release", style("chronicle release").cyan());
        }

        Ok(())
    }
}

/// Create the staging and release directories where the project root for
/// `config_path` will look for them
fn create_store_dirs(config_path: &Path) -> anyhow::Result<ChangesLayout> {
    let root = project_root(config_path);
    let layout = ChangesLayout::new(&root, &Config::default().changes);
    for dir in [&layout.next_release_dir, &layout.releases_dir] {
        std::fs::create_dir_all(dir)?;
        let keep = dir.join(".gitkeep");
        if !keep.exists() {
            std::fs::write(keep, "")?;
        }
    }
    Ok(layout)
}
