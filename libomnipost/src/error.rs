//! Error types for Omnipost

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OmnipostError>;

#[derive(Error, Debug)]
pub enum OmnipostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OmnipostError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OmnipostError::InvalidInput(_) => 3,
            OmnipostError::Platform(PlatformError::Authentication(_)) => 2,
            OmnipostError::Auth(_) => 2,
            OmnipostError::Platform(_) => 1,
            OmnipostError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised by the OAuth code-exchange and refresh flows.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("OAuth exchange failed: {0}")]
    Exchange(String),

    #[error("Authentication expired: {0}")]
    Expired(String),

    #[error("Invalid or expired state parameter")]
    InvalidState,

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
