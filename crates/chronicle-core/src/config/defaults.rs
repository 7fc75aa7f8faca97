//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".chronicle.toml",
        ".chronicle.yaml",
    ]
}

/// Generate default configuration TOML
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Chronicle Configuration

[changes]
dir = ".changes"
next_release_dir = "next-release"
releases_dir = "releases"
version_marker = "VERSION"
changelog_file = "CHANGELOG.md"
title = "Changelog"
wrap_width = 80

[github]
api_url = "https://api.github.com"
token_env = "GITHUB_TOKEN"
commit_env = "GITHUB_SHA"
repository_env = "GITHUB_REPOSITORY"

[amend]
base_branch = "main"
stage = true
"#;
