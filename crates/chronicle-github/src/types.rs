//! Review API types

use chronicle_core::config::{is_repository_slug, GitHubConfig};
use chronicle_core::error::{ConfigError, Result as CoreResult};
use serde::{Deserialize, Serialize};

/// Web host used for pull-request links
const WEB_URL: &str = "https://github.com";

/// Credentials and commit the remote calls act on.
///
/// Both values are required; a context can only be built when they are
/// present, so a missing credential surfaces before any request is made.
#[derive(Clone)]
pub struct RemoteContext {
    token: String,
    commit: String,
}

impl RemoteContext {
    /// Build a context from explicit values
    pub fn new(token: impl Into<String>, commit: impl Into<String>) -> CoreResult<Self> {
        let token = token.into();
        let commit = commit.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingContext("bearer token".to_string()).into());
        }
        if commit.trim().is_empty() {
            return Err(ConfigError::MissingContext("target commit".to_string()).into());
        }
        Ok(Self { token, commit })
    }

    /// Read the token and commit from the environment variables named in config
    pub fn from_env(config: &GitHubConfig) -> CoreResult<Self> {
        let token = std::env::var(&config.token_env)
            .map_err(|_| ConfigError::MissingContext(config.token_env.clone()))?;
        let commit = std::env::var(&config.commit_env)
            .map_err(|_| ConfigError::MissingContext(config.commit_env.clone()))?;
        Self::new(token, commit)
    }

    /// Bearer token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Commit SHA review comments are anchored to
    pub fn commit(&self) -> &str {
        &self.commit
    }
}

impl std::fmt::Debug for RemoteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteContext")
            .field("token", &"<redacted>")
            .field("commit", &self.commit)
            .finish()
    }
}

/// A pull request in a specific repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub number: u64,
}

impl PullRequest {
    /// Create from an `owner/name` slug and a number
    pub fn new(repository: &str, number: u64) -> CoreResult<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|_| is_repository_slug(repository))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "repository".to_string(),
                message: format!("expected `owner/name`, found: {}", repository),
            })?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }

    /// `owner/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Canonical reference recorded on a change, as a markdown link
    pub fn reference(&self) -> String {
        format!(
            "[#{}]({}/{}/{}/pull/{})",
            self.number, WEB_URL, self.owner, self.repo, self.number
        )
    }
}

/// A comment on the pull request conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID
    pub id: u64,
    /// Markdown body
    #[serde(default)]
    pub body: Option<String>,
    /// Browser URL
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Comment {
    /// Comment body, empty if absent
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A comment anchored to a file in the pull request diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    /// Comment ID
    pub id: u64,
    /// Markdown body
    #[serde(default)]
    pub body: Option<String>,
    /// File path the comment is attached to
    pub path: String,
    /// Last line of the anchor
    #[serde(default)]
    pub line: Option<u32>,
    /// First line of a multi-line anchor
    #[serde(default)]
    pub start_line: Option<u32>,
    /// Browser URL
    #[serde(default)]
    pub html_url: Option<String>,
}

impl ReviewComment {
    /// Comment body, empty if absent
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A review comment to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewComment {
    /// Markdown body
    pub body: String,
    /// File path, relative to the repository root
    pub path: String,
    /// First line of a range
    pub start_line: Option<u32>,
    /// Last line of a range (requires `start_line`)
    pub end_line: Option<u32>,
}

/// Result of an idempotent post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// A new comment was created
    Created { id: u64 },
    /// An identical comment already exists; nothing was posted
    Duplicate { id: u64 },
}

impl PostOutcome {
    /// Whether a new comment was created
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_reference() {
        let pr = PullRequest::new("smithy-lang/smithy", 9999).unwrap();
        assert_eq!(pr.slug(), "smithy-lang/smithy");
        assert_eq!(
            pr.reference(),
            "[#9999](https://github.com/smithy-lang/smithy/pull/9999)"
        );
    }

    #[test]
    fn test_pull_request_rejects_bad_slug() {
        assert!(PullRequest::new("smithy", 1).is_err());
        assert!(PullRequest::new("a/b/c", 1).is_err());
    }

    #[test]
    fn test_context_requires_token_and_commit() {
        assert!(RemoteContext::new("", "abc").is_err());
        assert!(RemoteContext::new("token", " ").is_err());
        let context = RemoteContext::new("token", "abc123").unwrap();
        assert_eq!(context.commit(), "abc123");
    }

    #[test]
    fn test_context_debug_redacts_token() {
        let context = RemoteContext::new("secret-token", "abc123").unwrap();
        let debug = format!("{:?}", context);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("abc123"));
    }

    #[test]
    fn test_comment_null_body() {
        let comment: Comment = serde_json::from_str(r#"{"id": 1, "body": null}"#).unwrap();
        assert_eq!(comment.body(), "");
    }
}
