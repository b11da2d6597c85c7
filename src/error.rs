//! Error types for the organization shell
//!
//! Every failure in this crate is recoverable: directory and store errors are
//! logged by the selection controller and degrade the shell to empty
//! selectors instead of blocking it. These types exist so callers (and the
//! CLI) can still see what went wrong.

use thiserror::Error;

/// Umbrella error for the shell crate
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures reported by a directory client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Network failure talking to directory: {message}")]
    Network { message: String },

    #[error("Directory rejected credentials (HTTP {status})")]
    Auth { status: u16 },

    #[error("Directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode directory response: {message}")]
    Decode { message: String },

    #[error("Invalid directory URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl DirectoryError {
    /// True for failures that a retry with the same credentials cannot fix
    pub fn is_auth(&self) -> bool {
        matches!(self, DirectoryError::Auth { .. })
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            DirectoryError::Decode {
                message: error.to_string(),
            }
        } else {
            DirectoryError::Network {
                message: error.to_string(),
            }
        }
    }
}

/// Failures flushing the key-value store to durable storage
///
/// Reads never produce these; a failed flush still leaves the new value
/// visible to readers in this process.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace store file {path}: {message}")]
    Persist { path: String, message: String },
}

/// Rejected selection requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Branch '{code}' is not in the branch list of the selected company")]
    UnknownBranch { code: String },

    #[error("Cannot select a branch before a company is selected")]
    NoCompanySelected,
}

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for convenience
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_converts_to_shell_error() {
        let err: ShellError = DirectoryError::Auth { status: 401 }.into();
        assert!(matches!(err, ShellError::Directory(DirectoryError::Auth { status: 401 })));
        assert_eq!(
            err.to_string(),
            "Directory error: Directory rejected credentials (HTTP 401)"
        );
    }

    #[test]
    fn test_is_auth() {
        assert!(DirectoryError::Auth { status: 403 }.is_auth());
        assert!(!DirectoryError::Network {
            message: "reset".into()
        }
        .is_auth());
    }
}
