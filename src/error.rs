//! Error types for Cryptoblog
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Cryptoblog operations
///
/// Application-level failures returned by the post service (for example a
/// rejected title) are *not* errors: they travel as
/// [`CreatePostResult::Err`](crate::post::CreatePostResult). This enum covers
/// everything that prevents a call from completing at all.
#[derive(Error, Debug)]
pub enum BlogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote post service could not be reached or answered with
    /// something other than the fixed response shape
    #[error("Transport error: {0}")]
    Transport(String),

    /// Authentication errors (expired or rejected session)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Login flow errors (callback, state mismatch, provider error)
    #[error("Login failed: {0}")]
    Login(String),

    /// Principal text could not be parsed
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// A requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An action that needs a logged-in session was attempted without one
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Interactive line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Cryptoblog operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
