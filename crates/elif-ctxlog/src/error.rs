//! Error types for logging setup
//!
//! Logging itself never fails; these cover configuration and subscriber
//! installation only.

use thiserror::Error;

/// Result type for logging setup
pub type CtxLogResult<T> = Result<T, CtxLogError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CtxLogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to install log subscriber: {message}")]
    Subscriber { message: String },
}

impl CtxLogError {
    pub fn subscriber<T: Into<String>>(message: T) -> Self {
        CtxLogError::Subscriber {
            message: message.into(),
        }
    }
}
