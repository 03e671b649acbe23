//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Tool invocations never surface these
//! directly: the gating wrapper folds them into a structured failure via
//! [`Error::failure_kind`].

use crate::tools::output::FailureKind;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the tools crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Context or service misconfigured (map to `Configuration`).
    #[error("configuration error: {0}")]
    Config(String),

    /// Tool arguments rejected (map to `InvalidArguments`).
    #[error("validation error: {0}")]
    Validation(String),

    /// File, tool or resource not found (map to `NotFound`).
    #[error("not found: {0}")]
    NotFound(String),

    /// Operating system refused access (map to `PermissionDenied`).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Shell command exited unsuccessfully (map to `CommandFailed`).
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Operation exceeded its time budget (map to `Timeout`).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Remote service answered with an error (map to `Network`).
    #[error("network error: {0}")]
    Network(String),

    /// Internal errors (map to `Internal`).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify into the failure kind reported back to the agent.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Config(_) => FailureKind::Configuration,
            Error::Validation(_) | Error::Serialization(_) => FailureKind::InvalidArguments,
            Error::NotFound(_) => FailureKind::NotFound,
            Error::PermissionDenied(_) => FailureKind::PermissionDenied,
            Error::CommandFailed(_) => FailureKind::CommandFailed,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Network(_) | Error::Http(_) => FailureKind::Network,
            Error::Internal(_) => FailureKind::Internal,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => FailureKind::NotFound,
                std::io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
                std::io::ErrorKind::TimedOut => FailureKind::Timeout,
                _ => FailureKind::Io,
            },
        }
    }
}

// Convenience constructors
impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn command_failed(msg: impl Into<String>) -> Self {
        Self::CommandFailed(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_map_by_kind() {
        let missing = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(missing.failure_kind(), FailureKind::NotFound);

        let denied = Error::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "nope",
        ));
        assert_eq!(denied.failure_kind(), FailureKind::PermissionDenied);

        let other = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(other.failure_kind(), FailureKind::Io);
    }

    #[test]
    fn test_config_error_is_configuration_kind() {
        let err = Error::config("search service is not configured");
        assert_eq!(err.failure_kind(), FailureKind::Configuration);
        assert_eq!(
            err.to_string(),
            "configuration error: search service is not configured"
        );
    }
}
