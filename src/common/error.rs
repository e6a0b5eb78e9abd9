//! Error types for the controller

use std::io;
use thiserror::Error;

/// Controller error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Connect failure, non-2xx status, timeout, or malformed response.
    #[error("request failed: {0}")]
    Transport(String),

    #[error("proxy '{0}' not found")]
    NotFound(String),

    #[error("'{0}' is not a policy group (Selector/URLTest/Fallback/LoadBalance)")]
    NotAGroup(String),

    #[error("node '{node}' is not in group '{group}'; members: {members}")]
    Validation {
        group: String,
        node: String,
        members: String,
    },

    #[error("config store error: {0}")]
    ConfigIo(String),
}

impl Error {
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Error::Transport(msg.into())
    }

    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Error::NotFound(name.into())
    }

    pub fn not_a_group<S: Into<String>>(name: S) -> Self {
        Error::NotAGroup(name.into())
    }

    pub fn config_io<S: Into<String>>(msg: S) -> Self {
        Error::ConfigIo(msg.into())
    }

    pub fn validation(group: &str, node: &str, members: &[String]) -> Self {
        Error::Validation {
            group: group.to_string(),
            node: node.to_string(),
            members: members.join(", "),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Transport(format!("invalid URL: {}", e))
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let e = Error::transport("connection refused");
        assert!(matches!(e, Error::Transport(_)));
    }

    #[test]
    fn test_error_display() {
        let e = Error::not_a_group("JP-01");
        assert_eq!(
            e.to_string(),
            "'JP-01' is not a policy group (Selector/URLTest/Fallback/LoadBalance)"
        );
    }

    #[test]
    fn test_validation_lists_members() {
        let members = vec!["a".to_string(), "b".to_string()];
        let e = Error::validation("Proxy", "zzz", &members);
        let msg = e.to_string();
        assert!(msg.contains("'zzz'"));
        assert!(msg.contains("'Proxy'"));
        assert!(msg.contains("a, b"));
    }
}
