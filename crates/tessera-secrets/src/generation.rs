//! Secret value generation rules

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rules the service follows when generating the initial secret value.
///
/// Serialized verbatim as the secret's `GenerateSecretString` property; unset
/// options are omitted so the service defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretStringGenerator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_characters: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_lowercase: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_numbers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_punctuation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_uppercase: Option<bool>,

    /// JSON key the generated value is stored under in `secret_string_template`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_string_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_space: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_each_included_type: Option<bool>,

    /// JSON object the generated value is merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_string_template: Option<String>,
}

impl SecretStringGenerator {
    /// Generate a JSON document `template` with the password stored under `key`
    pub fn json_with_key(template: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            secret_string_template: Some(template.into()),
            generate_string_key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Check options that must be set together
    pub fn validate(&self) -> Result<()> {
        match (&self.secret_string_template, &self.generate_string_key) {
            (Some(_), None) | (None, Some(_)) => Err(Error::invalid_generation_options(
                "`secretStringTemplate` and `generateStringKey` must be specified together",
            )),
            _ => Ok(()),
        }
    }
}
