//! Error types for tessera-core

use thiserror::Error;

/// Result type alias using tessera-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Tessera
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Schema validation error
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Construct id is empty or contains a path separator
    #[error("Invalid construct id '{id}': {reason}")]
    InvalidConstructId { id: String, reason: String },

    /// Construct id already used within the same parent
    #[error("There is already a construct with id '{path}'")]
    DuplicateConstruct { path: String },

    /// Two construct paths collapsed to the same logical id
    #[error("Logical id '{logical_id}' is already in use (construct '{path}')")]
    DuplicateLogicalId { logical_id: String, path: String },

    /// A reference points at a logical id that is not part of the stack
    #[error("Reference to unknown resource '{logical_id}'")]
    DanglingReference { logical_id: String },

    /// A resource node was expected to carry a property it does not have
    #[error("Resource '{logical_id}' has no {kind} property '{property}'")]
    MissingProperty {
        logical_id: String,
        property: String,
        kind: String,
    },

    /// One or more invariants failed during synthesis
    #[error("Synthesis failed with {count} error(s):\n  - {errors}")]
    Synthesis { count: usize, errors: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create an invalid construct id error
    pub fn invalid_construct_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstructId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate construct error
    pub fn duplicate_construct(path: impl Into<String>) -> Self {
        Self::DuplicateConstruct { path: path.into() }
    }

    /// Create a dangling reference error
    pub fn dangling_reference(logical_id: impl Into<String>) -> Self {
        Self::DanglingReference {
            logical_id: logical_id.into(),
        }
    }

    /// Create a missing property error
    pub fn missing_property(
        logical_id: impl Into<String>,
        property: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self::MissingProperty {
            logical_id: logical_id.into(),
            property: property.into(),
            kind: kind.into(),
        }
    }

    /// Create a synthesis error from the collected violations
    pub fn synthesis(errors: Vec<String>) -> Self {
        Self::Synthesis {
            count: errors.len(),
            errors: errors.join("\n  - "),
        }
    }
}
