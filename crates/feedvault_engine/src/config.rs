use std::env;

use thiserror::Error;

/// Coordinates of the remote file acting as the feed database.
///
/// Built explicitly and validated once at startup; the store client never
/// reads the environment itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub file_path: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

impl StoreConfig {
    /// Reads the five required coordinates from the environment.
    ///
    /// Absence of any of them is a fatal misconfiguration, reported before
    /// any network call is attempted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: required("GITHUB_TOKEN")?,
            owner: required("GITHUB_REPO_OWNER")?,
            repo: required("GITHUB_REPO_NAME")?,
            file_path: required("GITHUB_FILE_PATH")?,
            branch: required("GITHUB_BRANCH")?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_names_the_variable() {
        let err = required("FEEDVAULT_TEST_UNSET_VARIABLE").unwrap_err();
        assert_eq!(err, ConfigError::Missing("FEEDVAULT_TEST_UNSET_VARIABLE"));
    }
}
