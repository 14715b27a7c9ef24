//! The secret construct
//!
//! A [`Secret`] is a handle: the resource nodes it creates live in the
//! [`Stack`], and every mutating operation takes the stack by `&mut`. Handles
//! come from four places:
//!
//! - [`Secret::new`] creates an `AWS::SecretsManager::Secret` node.
//! - [`Secret::from_secret_arn`], [`Secret::from_secret_attributes`] and
//!   [`Secret::from_secret_name`] import a secret defined elsewhere.
//! - [`Secret::attach`] returns a handle addressing the secret through its
//!   target attachment. Rotation schedules added to that handle reference the
//!   attachment, which is what orders rotation after the attachment.

use crate::arn::{parse_secret_name, Arn};
use crate::attachment::SecretAttachmentTarget;
use crate::dynamic_reference::{DynamicReference, SecretValueOptions};
use crate::error::{Error, Result};
use crate::generation::SecretStringGenerator;
use crate::key::KeyRef;
use crate::rotation::{RotationSchedule, RotationScheduleOptions};
use std::collections::BTreeMap;
use tessera_core::{
    ConstructPath, Grant, Grantable, LogicalId, PolicyDocument, PolicyKind, PolicyStatement,
    PolicyValidation, Property, Pseudo, RemovalPolicy, ResourceNode, ResourceWithPolicy, Stack,
    Token,
};
use tracing::debug;

pub const SECRET_TYPE: &str = "AWS::SecretsManager::Secret";
pub const RESOURCE_POLICY_TYPE: &str = "AWS::SecretsManager::ResourcePolicy";
pub const TARGET_ATTACHMENT_TYPE: &str = "AWS::SecretsManager::SecretTargetAttachment";
pub const ROTATION_SCHEDULE_TYPE: &str = "AWS::SecretsManager::RotationSchedule";

const ATTACHMENT_ID: &str = "Attachment";

const READ_ACTIONS: [&str; 2] = [
    "secretsmanager:GetSecretValue",
    "secretsmanager:DescribeSecret",
];
const WRITE_ACTIONS: [&str; 2] = ["secretsmanager:PutSecretValue", "secretsmanager:UpdateSecret"];
const KEY_DECRYPT_ACTIONS: [&str; 1] = ["kms:Decrypt"];
const KEY_ENCRYPT_ACTIONS: [&str; 3] = ["kms:Encrypt", "kms:ReEncrypt*", "kms:GenerateDataKey*"];

/// Properties for a new secret
#[derive(Debug, Clone, Default)]
pub struct SecretProps {
    pub description: Option<String>,
    /// Physical name; generated by the service when unset
    pub secret_name: Option<String>,
    /// Encrypts the secret; the account's managed key is used when unset
    pub encryption_key: Option<KeyRef>,
    /// Rules for the initial value; service defaults when unset
    pub generate_secret_string: Option<SecretStringGenerator>,
    /// Falls back to `defaults.secretRemovalPolicy` from the stack configuration
    pub removal_policy: Option<RemovalPolicy>,
}

/// A secret imported by ARN together with its key
#[derive(Debug, Clone, Default)]
pub struct SecretAttributes {
    pub secret_arn: String,
    pub encryption_key: Option<KeyRef>,
}

#[derive(Debug, Clone, PartialEq)]
enum SecretOrigin {
    Owned(LogicalId),
    Attachment(LogicalId),
    Imported,
}

/// A handle to a secret
#[derive(Debug, Clone, PartialEq)]
pub struct Secret {
    path: ConstructPath,
    origin: SecretOrigin,
    secret_arn: Token,
    arn_for_policies: Token,
    /// Identifier placed in dynamic references
    value_id: Token,
    secret_name: Option<Token>,
    encryption_key: Option<KeyRef>,
}

impl Secret {
    pub fn new(stack: &mut Stack, id: &str, props: SecretProps) -> Result<Self> {
        let generator = props.generate_secret_string.unwrap_or_default();
        generator.validate()?;

        let path = stack.register_construct(None, id)?;
        let removal_policy = props
            .removal_policy
            .unwrap_or(stack.config().defaults.secret_removal_policy);

        let node = ResourceNode::new(SECRET_TYPE)
            .with_optional_property("Description", props.description)
            .with_optional_property("Name", props.secret_name.clone())
            .with_property("GenerateSecretString", serde_json::to_value(&generator)?)
            .with_optional_property(
                "KmsKeyId",
                props.encryption_key.as_ref().map(KeyRef::key_arn),
            )
            .with_removal_policy(removal_policy);
        let logical_id = stack.add_node(Some(&path), "Resource", node)?;

        let secret_arn = Token::reference(&logical_id);
        Ok(Self {
            path,
            origin: SecretOrigin::Owned(logical_id),
            arn_for_policies: secret_arn.clone(),
            value_id: secret_arn.clone(),
            secret_arn,
            secret_name: props.secret_name.map(Token::literal),
            encryption_key: props.encryption_key,
        })
    }

    /// Import a secret by its complete ARN
    pub fn from_secret_arn(stack: &mut Stack, id: &str, secret_arn: &str) -> Result<Self> {
        let name = parse_secret_name(secret_arn)?;
        let path = stack.register_construct(None, id)?;
        Ok(Self::imported(path, Token::literal(secret_arn), Some(name), None))
    }

    /// Import a secret by ARN along with the key that encrypts it.
    ///
    /// Only the generic ARN shape is checked; a name is derived when the
    /// resource looks like `secret:<name>-<suffix>`.
    pub fn from_secret_attributes(
        stack: &mut Stack,
        id: &str,
        attributes: SecretAttributes,
    ) -> Result<Self> {
        Arn::parse(&attributes.secret_arn)?;
        let name = parse_secret_name(&attributes.secret_arn).ok();
        let path = stack.register_construct(None, id)?;
        Ok(Self::imported(
            path,
            Token::literal(attributes.secret_arn),
            name,
            attributes.encryption_key,
        ))
    }

    /// Import a secret by name alone.
    ///
    /// The random ARN suffix is unknown, so policies target
    /// `arn:<partition>:secretsmanager:<region>:<account>:secret:<name>*` and
    /// dynamic references use the bare name.
    pub fn from_secret_name(stack: &mut Stack, id: &str, secret_name: &str) -> Result<Self> {
        let path = stack.register_construct(None, id)?;
        let partial_arn = Token::concat([
            Token::literal("arn:"),
            Token::pseudo(Pseudo::Partition),
            Token::literal(":secretsmanager:"),
            Token::pseudo(Pseudo::Region),
            Token::literal(":"),
            Token::pseudo(Pseudo::AccountId),
            Token::literal(format!(":secret:{}", secret_name)),
        ]);

        Ok(Self {
            path,
            origin: SecretOrigin::Imported,
            arn_for_policies: Token::concat([partial_arn.clone(), Token::literal("*")]),
            secret_arn: partial_arn,
            value_id: Token::literal(secret_name),
            secret_name: Some(Token::literal(secret_name)),
            encryption_key: None,
        })
    }

    fn imported(
        path: ConstructPath,
        secret_arn: Token,
        name: Option<String>,
        encryption_key: Option<KeyRef>,
    ) -> Self {
        Self {
            path,
            origin: SecretOrigin::Imported,
            arn_for_policies: secret_arn.clone(),
            value_id: secret_arn.clone(),
            secret_arn,
            secret_name: name.map(Token::literal),
            encryption_key,
        }
    }

    pub fn path(&self) -> &ConstructPath {
        &self.path
    }

    /// The node behind this handle: the secret itself or its attachment
    pub fn logical_id(&self) -> Option<&LogicalId> {
        match &self.origin {
            SecretOrigin::Owned(id) | SecretOrigin::Attachment(id) => Some(id),
            SecretOrigin::Imported => None,
        }
    }

    pub fn is_imported(&self) -> bool {
        self.origin == SecretOrigin::Imported
    }

    /// Whether the secret behind this handle has been attached in `stack`
    pub fn is_attached(&self, stack: &Stack) -> bool {
        stack.has_child(&self.path, ATTACHMENT_ID)
    }

    /// Identifier used as `SecretId` by resources that act on this handle
    pub fn secret_arn(&self) -> &Token {
        &self.secret_arn
    }

    /// Resource pattern placed in policy statements
    pub fn arn_for_policies(&self) -> &Token {
        &self.arn_for_policies
    }

    /// The secret's name, when known without deployment
    pub fn secret_name(&self) -> Option<&Token> {
        self.secret_name.as_ref()
    }

    pub fn encryption_key(&self) -> Option<&KeyRef> {
        self.encryption_key.as_ref()
    }

    /// `{{resolve:secretsmanager:<id>:SecretString:::}}`
    pub fn secret_value(&self) -> Token {
        self.secret_value_with(&SecretValueOptions::default())
    }

    /// `{{resolve:secretsmanager:<id>:SecretString:<field>::}}`
    pub fn secret_value_from_json(&self, json_field: &str) -> Token {
        self.secret_value_with(&SecretValueOptions::json_field(json_field))
    }

    pub fn secret_value_with(&self, options: &SecretValueOptions) -> Token {
        DynamicReference::secrets_manager(&self.value_id, options).to_token()
    }

    fn via_service() -> Token {
        Token::concat([
            Token::literal("secretsmanager."),
            Token::pseudo(Pseudo::Region),
            Token::literal(".amazonaws.com"),
        ])
    }

    /// Allow `grantee` to read the secret value, optionally only for the given
    /// version stages. A key, when set, also gets a decrypt statement.
    pub fn grant_read(
        &self,
        stack: &mut Stack,
        grantee: &dyn Grantable,
        version_stages: Option<&[&str]>,
    ) -> Result<Grant> {
        let mut statement = PolicyStatement::new()
            .with_actions(READ_ACTIONS)
            .with_resources([self.arn_for_policies.clone()]);
        if let Some(stages) = version_stages {
            statement.add_condition(
                "ForAnyValue:StringEquals",
                "secretsmanager:VersionStage",
                Property::tokens(stages.iter().copied()),
            );
        }

        let grant = Grant::add_to_principal_or_resource(stack, grantee, statement, self)?;
        if let Some(key) = &self.encryption_key {
            key.grant_via_service(stack, grantee, &KEY_DECRYPT_ACTIONS, Self::via_service())?;
        }

        debug!("Granted read on {} to {}", self.path, grantee.grant_principal());
        Ok(grant)
    }

    /// Allow `grantee` to change the secret value
    pub fn grant_write(&self, stack: &mut Stack, grantee: &dyn Grantable) -> Result<Grant> {
        let statement = PolicyStatement::new()
            .with_actions(WRITE_ACTIONS)
            .with_resources([self.arn_for_policies.clone()]);

        let grant = Grant::add_to_principal_or_resource(stack, grantee, statement, self)?;
        if let Some(key) = &self.encryption_key {
            key.grant_via_service(stack, grantee, &KEY_ENCRYPT_ACTIONS, Self::via_service())?;
        }

        debug!("Granted write on {} to {}", self.path, grantee.grant_principal());
        Ok(grant)
    }

    /// Logical id of the resource policy, once one has been created
    pub fn resource_policy(&self, stack: &Stack) -> Option<LogicalId> {
        stack.logical_id_at(&self.path, "Policy").cloned()
    }

    /// Attach the secret to a database. Returns a handle that addresses the
    /// secret through the attachment.
    ///
    /// A secret can be attached only once, whichever handle or clone is used,
    /// and a handle returned by `attach` cannot be attached again.
    pub fn attach(&self, stack: &mut Stack, target: &dyn SecretAttachmentTarget) -> Result<Secret> {
        if matches!(self.origin, SecretOrigin::Attachment(_)) || self.is_attached(stack) {
            return Err(Error::already_attached(self.path.to_string()));
        }

        let target = target.as_secret_attachment_target();
        let path = stack.register_construct(Some(&self.path), ATTACHMENT_ID)?;
        let node = ResourceNode::new(TARGET_ATTACHMENT_TYPE)
            .with_property("SecretId", self.secret_arn.clone())
            .with_property("TargetId", target.target_id)
            .with_property("TargetType", target.target_type.as_str());
        let logical_id = stack.add_node(Some(&path), "Resource", node)?;

        debug!("Attached {} to {}", self.path, target.target_type);
        let secret_arn = Token::reference(&logical_id);
        Ok(Secret {
            path,
            origin: SecretOrigin::Attachment(logical_id),
            arn_for_policies: secret_arn.clone(),
            value_id: secret_arn.clone(),
            secret_arn,
            secret_name: self.secret_name.clone(),
            encryption_key: self.encryption_key.clone(),
        })
    }

    /// Rotate the secret on a schedule. The schedule's `SecretId` is this
    /// handle's identifier.
    pub fn add_rotation_schedule(
        &self,
        stack: &mut Stack,
        id: &str,
        options: RotationScheduleOptions,
    ) -> Result<RotationSchedule> {
        let days = options.rotation_days()?;
        let function_arn = options.rotation_lambda.function_arn().clone();
        let path = stack.register_construct(Some(&self.path), id)?;

        let permission = ResourceNode::new("AWS::Lambda::Permission")
            .with_property("Action", "lambda:InvokeFunction")
            .with_property("FunctionName", function_arn.clone())
            .with_property("Principal", "secretsmanager.amazonaws.com");
        let permission_id = stack.add_node(Some(&path), "Permission", permission)?;

        let rotation_rules =
            BTreeMap::from([("AutomaticallyAfterDays".to_string(), Property::from(days))]);
        let mut schedule = ResourceNode::new(ROTATION_SCHEDULE_TYPE)
            .with_property("SecretId", self.secret_arn.clone())
            .with_property("RotationLambdaARN", function_arn)
            .with_property("RotationRules", Property::Map(rotation_rules));
        schedule.add_dependency(permission_id.clone());
        let logical_id = stack.add_node(Some(&path), "Resource", schedule)?;

        debug!("Rotation schedule {} every {} days", logical_id, days);
        Ok(RotationSchedule::new(logical_id, permission_id))
    }

    fn ensure_resource_policy(&self, stack: &mut Stack) -> tessera_core::Result<LogicalId> {
        if let Some(existing) = self.resource_policy(stack) {
            return Ok(existing);
        }

        let node = ResourceNode::new(RESOURCE_POLICY_TYPE)
            .with_property("SecretId", self.secret_arn.clone())
            .with_property("ResourcePolicy", PolicyDocument::new());
        let policy_id = stack.add_node(Some(&self.path), "Policy", node)?;
        stack.add_validation(Box::new(PolicyValidation::new(
            policy_id.clone(),
            "ResourcePolicy",
            PolicyKind::Resource,
        )));

        debug!("Created resource policy {} for {}", policy_id, self.path);
        Ok(policy_id)
    }
}

impl ResourceWithPolicy for Secret {
    /// Imported secrets are owned elsewhere; their policy is left alone.
    fn add_to_resource_policy(
        &self,
        stack: &mut Stack,
        statement: PolicyStatement,
    ) -> tessera_core::Result<bool> {
        if self.is_imported() {
            return Ok(false);
        }

        let policy_id = self.ensure_resource_policy(stack)?;
        stack
            .policy_mut(&policy_id, "ResourcePolicy")?
            .add_statement(statement);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_validation_does_not_claim_id() {
        let mut stack = Stack::named("test");
        let props = SecretProps {
            generate_secret_string: Some(SecretStringGenerator {
                generate_string_key: Some("password".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(Secret::new(&mut stack, "Secret", props).is_err());
        assert!(Secret::new(&mut stack, "Secret", SecretProps::default()).is_ok());
    }

    #[test]
    fn test_removal_policy_from_config() {
        let mut config = tessera_core::StackConfig::new("test");
        config.defaults.secret_removal_policy = RemovalPolicy::Retain;
        let mut stack = Stack::new(config);

        let secret = Secret::new(&mut stack, "Secret", SecretProps::default()).unwrap();
        let template = stack.synth().unwrap();
        let resource = template
            .resource(secret.logical_id().unwrap().as_str())
            .unwrap();
        assert_eq!(resource["DeletionPolicy"], json!("Retain"));
        assert_eq!(resource["UpdateReplacePolicy"], json!("Retain"));
    }

    #[test]
    fn test_imported_secret_has_no_resource_policy() {
        let mut stack = Stack::named("test");
        let secret = Secret::from_secret_arn(
            &mut stack,
            "Imported",
            "arn:aws:secretsmanager:us-east-1:111122223333:secret:db-AbC123",
        )
        .unwrap();

        let added = secret
            .add_to_resource_policy(
                &mut stack,
                PolicyStatement::new().with_actions(["secretsmanager:GetSecretValue"]),
            )
            .unwrap();
        assert!(!added);
        assert_eq!(stack.resource_count(), 0);
    }

    #[test]
    fn test_attributes_accept_unsuffixed_arn() {
        let mut stack = Stack::named("test");
        let secret = Secret::from_secret_attributes(
            &mut stack,
            "Imported",
            SecretAttributes {
                secret_arn: "arn:aws:secretsmanager:us-east-1:111122223333:secret:plain".into(),
                encryption_key: Some(KeyRef::from_key_arn(
                    "arn:aws:kms:us-east-1:111122223333:key/1234abcd",
                )),
            },
        )
        .unwrap();
        assert!(secret.secret_name().is_none());
        assert!(secret.encryption_key().is_some());

        let err = Secret::from_secret_attributes(
            &mut stack,
            "Broken",
            SecretAttributes {
                secret_arn: "arn:aws:secretsmanager:us-east-1:111122223333:".into(),
                encryption_key: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArn { .. }));
    }
}
