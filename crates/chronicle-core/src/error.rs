//! Error types for Chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Main error type for Chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Remote API errors
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// A value required from the execution context is absent
    #[error("Missing required context: {0}")]
    MissingContext(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// A branch or revision could not be resolved
    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    /// Path is outside of the working directory
    #[error("Path is outside the repository working directory: {0}")]
    OutsideWorkdir(PathBuf),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version. Expected `major.minor.patch` (e.g. `1.2.3`), but found: {0}")]
    InvalidFormat(String),

    /// Invalid bump kind
    #[error("Invalid bump kind: {0}")]
    InvalidBumpKind(String),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// A staged or persisted record could not be parsed
    #[error("Failed to parse {}: {reason}", path.display())]
    ParseFailed { path: PathBuf, reason: String },

    /// A change record violates its schema
    #[error("Invalid change: {0}")]
    InvalidChange(String),

    /// No persisted release with the given version
    #[error("Release not found: {0}")]
    ReleaseNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the code-hosting review API
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-2xx response, carrying the decoded error payload
    #[error("API error: {status} - {payload}")]
    Api {
        status: u16,
        payload: serde_json::Value,
    },

    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// A response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// `end_line` was given without `start_line`
    #[error("Invalid line range: end_line {end_line} given without start_line")]
    InvalidLineRange { end_line: u32 },

    /// `start_line` is after `end_line`
    #[error("Invalid line range: start_line {start_line} is after end_line {end_line}")]
    InvertedLineRange { start_line: u32, end_line: u32 },
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Nothing is staged for the next release
    #[error("No staged changes found; a release must contain at least one change")]
    NoStagedChanges,

    /// Neither a version marker nor a prior release exists
    #[error("No base version: no version marker and no existing releases to bump from")]
    NoBaseVersion,

    /// User cancelled
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl ChronicleError {
    /// Whether the error is a validation failure detected before any side effect
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Workflow(_)
                | Self::Config(ConfigError::MissingContext(_))
                | Self::Remote(RemoteError::InvalidLineRange { .. })
                | Self::Remote(RemoteError::InvertedLineRange { .. })
        )
    }
}
