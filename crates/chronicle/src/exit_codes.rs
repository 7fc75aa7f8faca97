//! Exit codes for the CLI

use chronicle_core::error::{ChronicleError, RemoteError, WorkflowError};

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Version error
pub const VERSION_ERROR: i32 = 4;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// Remote API error
pub const REMOTE_ERROR: i32 = 6;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<ChronicleError>() else {
        return ERROR;
    };

    match err {
        ChronicleError::Workflow(WorkflowError::Cancelled) => CANCELLED,
        e if e.is_precondition() => VALIDATION_ERROR,
        ChronicleError::Config(_) => CONFIG_ERROR,
        ChronicleError::Git(_) => GIT_ERROR,
        ChronicleError::Version(_) => VERSION_ERROR,
        ChronicleError::Changelog(_) => VALIDATION_ERROR,
        ChronicleError::Remote(RemoteError::Api { .. } | RemoteError::Transport(_)) => REMOTE_ERROR,
        ChronicleError::Remote(_) => VALIDATION_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::error::{ConfigError, GitError, VersionError};

    fn code(err: impl Into<ChronicleError>) -> i32 {
        for_error(&anyhow::Error::new(err.into()))
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(code(WorkflowError::NoStagedChanges), VALIDATION_ERROR);
        assert_eq!(code(WorkflowError::Cancelled), CANCELLED);
        assert_eq!(code(ConfigError::MissingContext("GITHUB_TOKEN".into())), VALIDATION_ERROR);
        assert_eq!(code(ConfigError::InvalidValue {
                field: "changes.wrap_width".into(),
                message: "must be positive".into()
            }), CONFIG_ERROR);
        assert_eq!(code(GitError::UnknownRevision("main".into())), GIT_ERROR);
        assert_eq!(code(VersionError::InvalidFormat("1.2".into())), VERSION_ERROR);
        assert_eq!(
            code(RemoteError::Api {
                status: 500,
                payload: serde_json::Value::Null
            }),
            REMOTE_ERROR
        );
    }

    #[test]
    fn test_foreign_errors_are_generic() {
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
