//! Dynamic references
//!
//! A dynamic reference is a `{{resolve:<service>:<key>}}` placeholder that
//! the provisioning engine replaces at deployment time. Building one never
//! reads a secret.

use std::fmt;
use tessera_core::Token;

/// Services a dynamic reference can resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicReferenceService {
    Ssm,
    SsmSecure,
    SecretsManager,
}

impl DynamicReferenceService {
    pub fn as_str(&self) -> &'static str {
        match self {
            DynamicReferenceService::Ssm => "ssm",
            DynamicReferenceService::SsmSecure => "ssm-secure",
            DynamicReferenceService::SecretsManager => "secretsmanager",
        }
    }
}

impl fmt::Display for DynamicReferenceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which part of a secret value to reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretValueOptions {
    /// Key within a JSON secret string
    pub json_field: Option<String>,
    pub version_stage: Option<String>,
    pub version_id: Option<String>,
}

impl SecretValueOptions {
    pub fn json_field(field: impl Into<String>) -> Self {
        Self {
            json_field: Some(field.into()),
            ..Default::default()
        }
    }
}

/// A `{{resolve:...}}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicReference {
    service: DynamicReferenceService,
    key: Token,
}

impl DynamicReference {
    pub fn new(service: DynamicReferenceService, key: impl Into<Token>) -> Self {
        Self {
            service,
            key: key.into(),
        }
    }

    /// `<secret-id>:SecretString:<json-field>:<version-stage>:<version-id>`,
    /// with empty segments for unset options
    pub fn secrets_manager(secret_id: impl Into<Token>, options: &SecretValueOptions) -> Self {
        let key = Token::concat([
            secret_id.into(),
            Token::literal(format!(
                ":SecretString:{}:{}:{}",
                options.json_field.as_deref().unwrap_or_default(),
                options.version_stage.as_deref().unwrap_or_default(),
                options.version_id.as_deref().unwrap_or_default(),
            )),
        ]);
        Self::new(DynamicReferenceService::SecretsManager, key)
    }

    pub fn service(&self) -> DynamicReferenceService {
        self.service
    }

    pub fn to_token(&self) -> Token {
        Token::concat([
            Token::literal(format!("{{{{resolve:{}:", self.service)),
            self.key.clone(),
            Token::literal("}}"),
        ])
    }
}

impl From<DynamicReference> for Token {
    fn from(reference: DynamicReference) -> Self {
        reference.to_token()
    }
}
