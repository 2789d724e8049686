//! Centralized error types for the Quill service.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides short messages for CLI output
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level service error type.
///
/// Startup and server errors are convertible to this type.
/// Use `user_message()` for the one-line message the CLI prints.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Returns a short message suitable for terminal output.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Server(_) => "The server failed to start.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "Unable to reach the upstream service.",
            NetworkError::Timeout => "The upstream service timed out.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The upstream service is experiencing issues."
            }
            NetworkError::ServerError { .. } => "The upstream request failed.",
            NetworkError::InvalidResponse(_) => "Received an unexpected upstream response.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let config_err = ConfigError::Invalid("server.bind_addr".into());
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Config(ConfigError::ParseError("expected `=`".into()));
        assert_eq!(
            app_err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
    }

    #[test]
    fn test_user_message_hides_detail() {
        let app_err = AppError::Server("Failed to bind 127.0.0.1:8000: address in use".into());
        assert_eq!(app_err.user_message(), "The server failed to start.");
        assert!(app_err.to_string().contains("address in use"));
    }

    #[test]
    fn test_server_error_status_split() {
        let upstream_down = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        let bad_request = NetworkError::ServerError {
            status: 400,
            message: "bad".into(),
        };
        assert_ne!(upstream_down.user_message(), bad_request.user_message());
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = NetworkError::ConnectionFailed("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
