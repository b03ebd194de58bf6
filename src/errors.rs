//! Error types for the Zivra Pay SDK.
//!
//! This module defines all error types that can occur during gateway calls
//! and card encryption.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Zivra Pay operations.
#[derive(Error, Debug)]
pub enum ZivraError {
    /// The configured public key file does not exist
    #[error("Public key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    /// The public key file exists but could not be read
    #[error("Failed to read public key {}: {source}", .path.display())]
    KeyReadError {
        /// Path of the key file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Card encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    /// The gateway returned a non-success status, or could not be reached
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code, or 500 when no response was received
        status: u16,
        /// Server-provided message, or a synthesized one naming the path
        message: String,
        /// Raw response body, when a response was received
        body: Option<String>,
    },

    /// Unknown or empty HTTP verb passed to a raw request
    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethodError(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error during HTTP request/response handling
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing URL
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

/// Result type alias for Zivra Pay operations.
pub type Result<T> = std::result::Result<T, ZivraError>;

impl From<openssl::error::ErrorStack> for ZivraError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        ZivraError::EncryptionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZivraError::EncryptionError("data too large for key size".to_string());
        assert_eq!(err.to_string(), "Encryption failed: data too large for key size");
    }

    #[test]
    fn test_api_error_display() {
        let err = ZivraError::ApiError {
            status: 400,
            message: "Invalid card details".to_string(),
            body: Some("{\"message\":\"Invalid card details\"}".to_string()),
        };
        assert_eq!(err.to_string(), "API error (400): Invalid card details");
    }

    #[test]
    fn test_invalid_method_display() {
        let err = ZivraError::InvalidMethodError(String::new());
        assert_eq!(err.to_string(), "Invalid HTTP method: \"\"");
    }

    #[test]
    fn test_key_not_found_display() {
        let err = ZivraError::KeyNotFound(PathBuf::from("/keys/missing.pem"));
        assert_eq!(err.to_string(), "Public key file not found: /keys/missing.pem");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: ZivraError = json_err.into();
        assert!(matches!(err, ZivraError::JsonError(_)));
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
