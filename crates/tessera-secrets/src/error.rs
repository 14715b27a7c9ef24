//! Error types for tessera-secrets

use thiserror::Error;

/// Result type alias using tessera-secrets' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building secret constructs
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the core resource graph
    #[error(transparent)]
    Core(#[from] tessera_core::Error),

    /// ARN could not be parsed
    #[error("Invalid ARN format: '{arn}' ({reason})")]
    InvalidArn { arn: String, reason: String },

    /// Generation options are inconsistent
    #[error("Invalid secret generation options: {message}")]
    InvalidGenerationOptions { message: String },

    /// The secret already has an attachment
    #[error("Secret '{secret}' is already attached to a target")]
    AlreadyAttached { secret: String },

    /// Rotation schedule cannot be built
    #[error("Invalid rotation schedule: {message}")]
    InvalidRotation { message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_arn(arn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArn {
            arn: arn.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_generation_options(message: impl Into<String>) -> Self {
        Self::InvalidGenerationOptions {
            message: message.into(),
        }
    }

    pub fn already_attached(secret: impl Into<String>) -> Self {
        Self::AlreadyAttached {
            secret: secret.into(),
        }
    }

    pub fn invalid_rotation(message: impl Into<String>) -> Self {
        Self::InvalidRotation {
            message: message.into(),
        }
    }
}
