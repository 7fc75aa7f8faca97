//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Narrowest wrap width that still leaves room for nested list items
const MIN_WRAP_WIDTH: usize = 20;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changes(config)?;
    validate_github(config)?;
    validate_amend(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_changes(config: &Config) -> Result<()> {
    let dirs = [
        ("changes.dir", &config.changes.dir),
        ("changes.next_release_dir", &config.changes.next_release_dir),
        ("changes.releases_dir", &config.changes.releases_dir),
        ("changes.changelog_file", &config.changes.changelog_file),
    ];
    for (field, path) in dirs {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "path cannot be empty".to_string(),
            }
            .into());
        }
    }

    if config.changes.next_release_dir == config.changes.releases_dir {
        return Err(ConfigError::InvalidValue {
            field: "changes.releases_dir".to_string(),
            message: "must differ from changes.next_release_dir".to_string(),
        }
        .into());
    }

    if config.changes.wrap_width < MIN_WRAP_WIDTH {
        return Err(ConfigError::InvalidValue {
            field: "changes.wrap_width".to_string(),
            message: format!("must be at least {}", MIN_WRAP_WIDTH),
        }
        .into());
    }

    Ok(())
}

fn validate_github(config: &Config) -> Result<()> {
    match url::Url::parse(&config.github.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return Err(ConfigError::InvalidValue {
                field: "github.api_url".to_string(),
                message: "must be an http(s) URL".to_string(),
            }
            .into());
        }
    }

    if let Some(repository) = &config.github.repository {
        if !is_repository_slug(repository) {
            return Err(ConfigError::InvalidValue {
                field: "github.repository".to_string(),
                message: "must be in `owner/name` form".to_string(),
            }
            .into());
        }
    }

    if config.github.token_env.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "github.token_env".to_string(),
            message: "environment variable name cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_amend(config: &Config) -> Result<()> {
    if config.amend.base_branch.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "amend.base_branch".to_string(),
            message: "branch cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Whether a string looks like `owner/name`
pub fn is_repository_slug(value: &str) -> bool {
    match value.split_once('/') {
        Some((owner, name)) => !owner.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_narrow_wrap_width() {
        let mut config = Config::default();
        config.changes.wrap_width = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_same_directories() {
        let mut config = Config::default();
        config.changes.releases_dir = config.changes.next_release_dir.clone();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_repository_slug() {
        let mut config = Config::default();
        config.github.repository = Some("smithy-lang/smithy".to_string());
        assert!(validate_config(&config).is_ok());

        config.github.repository = Some("not-a-slug".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_api_url() {
        let mut config = Config::default();
        config.github.api_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_is_repository_slug() {
        assert!(is_repository_slug("owner/repo"));
        assert!(!is_repository_slug("owner/"));
        assert!(!is_repository_slug("a/b/c"));
        assert!(!is_repository_slug("repo"));
    }
}
