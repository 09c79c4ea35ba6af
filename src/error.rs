// src/error.rs

//! Unified error handling for the relay.

use std::fmt;

use thiserror::Error;

use crate::models::Source;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The account does not exist on the mirrored platform
    #[error("'{handle}' not found on {platform}")]
    NotFound { platform: Source, handle: String },

    /// Every configured mirror failed to answer successfully
    #[error("All {platform} mirrors are down")]
    AllMirrorsDown { platform: Source },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The delivery channel rejected a message
    #[error("Delivery error in {method}: {message}")]
    Delivery { method: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a delivery error for a bot API method.
    pub fn delivery(method: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            method: method.into(),
            message: message.to_string(),
        }
    }

    /// Whether the poll loop may carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
