//! Error types for Radiobar Core

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Session error types
#[derive(Error, Debug)]
pub enum Error {
    // Settings errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings key {key} has an unexpected shape")]
    SettingsShape { key: String },

    // Station errors
    #[error("Unknown station URL: {0}")]
    UnknownStation(String),

    // Lifecycle errors
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidLifecycleTransition { from: String, to: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns a short stable code for log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Io(_) => "IO",
            Error::Json(_) => "JSON",
            Error::SettingsShape { .. } => "SETTINGS_SHAPE",
            Error::UnknownStation(_) => "UNKNOWN_STATION",
            Error::InvalidLifecycleTransition { .. } => "INVALID_LIFECYCLE",
            Error::Config(_) => "CONFIG",
            Error::Url(_) => "URL",
        }
    }
}
