//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for Chronicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Change and release storage
    pub changes: ChangesConfig,

    /// Code-hosting API settings
    pub github: GitHubConfig,

    /// Pull-request annotation settings
    pub amend: AmendConfig,
}

/// Where staged changes, releases and rendered output live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesConfig {
    /// Root of the changes tree, relative to the project root
    pub dir: PathBuf,

    /// Staging area for the next release, relative to `dir`
    pub next_release_dir: PathBuf,

    /// Persisted releases, relative to `dir`
    pub releases_dir: PathBuf,

    /// Plain-text file holding the current version, relative to the project root
    pub version_marker: Option<PathBuf>,

    /// Rendered changelog, relative to the project root
    pub changelog_file: PathBuf,

    /// Title of the rendered changelog
    pub title: String,

    /// Column at which rendered text is wrapped
    pub wrap_width: usize,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".changes"),
            next_release_dir: PathBuf::from("next-release"),
            releases_dir: PathBuf::from("releases"),
            version_marker: Some(PathBuf::from("VERSION")),
            changelog_file: PathBuf::from("CHANGELOG.md"),
            title: "Changelog".to_string(),
            wrap_width: 80,
        }
    }
}

/// Code-hosting review API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL
    pub api_url: String,

    /// Repository in `owner/name` form
    pub repository: Option<String>,

    /// Environment variable holding the bearer token
    pub token_env: String,

    /// Environment variable holding the commit under review
    pub commit_env: String,

    /// Environment variable holding the repository, used when `repository` is unset
    pub repository_env: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            repository: None,
            token_env: "GITHUB_TOKEN".to_string(),
            commit_env: "GITHUB_SHA".to_string(),
            repository_env: "GITHUB_REPOSITORY".to_string(),
            user_agent: concat!("chronicle/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Amend workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmendConfig {
    /// Branch the pull request will merge into
    pub base_branch: String,

    /// Whether patched change files are added to the git index
    pub stage: bool,
}

impl Default for AmendConfig {
    fn default() -> Self {
        Self {
            base_branch: "main".to_string(),
            stage: true,
        }
    }
}

/// Resolved on-disk locations for one project.
///
/// Built once from [`Config`] and a project root, then handed to every
/// component that touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesLayout {
    /// Project root
    pub root: PathBuf,
    /// Staged change files
    pub next_release_dir: PathBuf,
    /// Persisted release files
    pub releases_dir: PathBuf,
    /// Version marker file, if configured
    pub version_marker: Option<PathBuf>,
    /// Rendered changelog
    pub changelog_file: PathBuf,
}

impl ChangesLayout {
    /// Resolve the configured paths against a project root
    pub fn new(root: &Path, config: &ChangesConfig) -> Self {
        let changes_dir = root.join(&config.dir);
        Self {
            root: root.to_path_buf(),
            next_release_dir: changes_dir.join(&config.next_release_dir),
            releases_dir: changes_dir.join(&config.releases_dir),
            version_marker: config.version_marker.as_ref().map(|p| root.join(p)),
            changelog_file: root.join(&config.changelog_file),
        }
    }

    /// Layout with the default directory names under `root`
    pub fn with_defaults(root: &Path) -> Self {
        Self::new(root, &ChangesConfig::default())
    }

    /// Staging directory relative to the project root, as it appears in diffs
    pub fn next_release_relative(&self) -> PathBuf {
        self.next_release_dir
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.next_release_dir.clone())
    }
}
