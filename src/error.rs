//! Error types and handling for Eos
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Eos operations
pub type Result<T> = std::result::Result<T, EosError>;

/// Main error type for Eos
#[derive(Debug, Error)]
pub enum EosError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP transport errors talking to the EO cloud
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// EO cloud API errors (unexpected payloads, rejected requests)
    #[error("API error: {message}")]
    Api { message: String },

    /// Authentication/authorization errors
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl EosError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        EosError::Config {
            message: message.into(),
        }
    }

    /// Create a new HTTP error
    pub fn http<S: Into<String>>(message: S) -> Self {
        EosError::Http {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        EosError::Api {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        EosError::Auth {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        EosError::Io {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        EosError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        EosError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        EosError::Generic {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EosError {
    fn from(err: std::io::Error) -> Self {
        EosError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for EosError {
    fn from(err: serde_yaml::Error) -> Self {
        EosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EosError {
    fn from(err: serde_json::Error) -> Self {
        EosError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for EosError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EosError::timeout(err.to_string())
        } else {
            EosError::http(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for EosError {
    fn from(err: chrono::ParseError) -> Self {
        EosError::validation("datetime", &err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = EosError::config("test config error");
        assert!(matches!(err, EosError::Config { .. }));

        let err = EosError::api("test api error");
        assert!(matches!(err, EosError::Api { .. }));

        let err = EosError::validation("field", "test validation error");
        assert!(matches!(err, EosError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = EosError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = EosError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");
    }
}
