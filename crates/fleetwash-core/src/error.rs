//! Error types for the pricing engine
//!
//! Missing scan data is never an error here; it is reported through result
//! fields. These variants cover faults in configuration and its decoding.

use thiserror::Error;

/// Error type for fleetwash engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FleetwashError {
    /// Configuration values that fail validation
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// Configuration text that could not be decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String, format: Option<String> },

    /// Reading a configuration file failed
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl FleetwashError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            FleetwashError::Configuration { .. } => "configuration",
            FleetwashError::Serialization { .. } => "serialization",
            FleetwashError::Io { .. } => "io",
        }
    }

    /// Configuration error tied to a specific setting
    pub fn configuration(message: impl Into<String>, setting: impl Into<String>) -> Self {
        FleetwashError::Configuration { message: message.into(), setting: Some(setting.into()) }
    }

    /// The offending setting, when one is known
    pub fn setting(&self) -> Option<&str> {
        match self {
            FleetwashError::Configuration { setting, .. } => setting.as_deref(),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for FleetwashError {
    fn from(err: toml::de::Error) -> Self {
        FleetwashError::Serialization {
            message: err.message().to_string(),
            format: Some("toml".to_string()),
        }
    }
}

/// Result alias for fleetwash engine operations
pub type Result<T> = std::result::Result<T, FleetwashError>;
