//! KMS keys used to encrypt secrets

use crate::error::Result;
use tessera_core::{
    ConstructPath, Grant, Grantable, LogicalId, PolicyDocument, PolicyKind, PolicyPrincipal,
    PolicyStatement, PolicyValidation, RemovalPolicy, ResourceNode, ResourceWithPolicy, Stack,
    Token,
};
use tracing::{debug, warn};

const KEY_POLICY: &str = "KeyPolicy";

/// Properties for a new key
#[derive(Debug, Clone, Default)]
pub struct KeyProps {
    pub description: Option<String>,
    pub enable_key_rotation: bool,
    /// Falls back to `defaults.keyRemovalPolicy` from the stack configuration
    pub removal_policy: Option<RemovalPolicy>,
}

/// A customer managed KMS key owned by the stack
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    path: ConstructPath,
    logical_id: LogicalId,
}

impl Key {
    /// Create a key whose policy lets the account root administer it
    pub fn new(stack: &mut Stack, id: &str, props: KeyProps) -> Result<Self> {
        let path = stack.register_construct(None, id)?;

        let key_policy = PolicyDocument::new().with_statement(
            PolicyStatement::new()
                .with_actions(["kms:*"])
                .with_principal(PolicyPrincipal::account_root())
                .with_resources(["*"]),
        );
        let removal_policy = props
            .removal_policy
            .unwrap_or(stack.config().defaults.key_removal_policy);

        let node = ResourceNode::new("AWS::KMS::Key")
            .with_property(KEY_POLICY, key_policy)
            .with_optional_property("Description", props.description)
            .with_property("EnableKeyRotation", props.enable_key_rotation)
            .with_removal_policy(removal_policy);

        let logical_id = stack.add_node(Some(&path), "Resource", node)?;
        stack.add_validation(Box::new(PolicyValidation::new(
            logical_id.clone(),
            KEY_POLICY,
            PolicyKind::Resource,
        )));

        Ok(Self { path, logical_id })
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn path(&self) -> &ConstructPath {
        &self.path
    }

    pub fn key_arn(&self) -> Token {
        Token::get_att(&self.logical_id, "Arn")
    }

    pub fn key_id(&self) -> Token {
        Token::reference(&self.logical_id)
    }
}

impl ResourceWithPolicy for Key {
    fn add_to_resource_policy(
        &self,
        stack: &mut Stack,
        statement: PolicyStatement,
    ) -> tessera_core::Result<bool> {
        stack
            .policy_mut(&self.logical_id, KEY_POLICY)?
            .add_statement(statement);
        Ok(true)
    }
}

/// The key a secret is encrypted with
#[derive(Debug, Clone, PartialEq)]
pub enum KeyRef {
    /// A key in this stack; its policy can be amended
    Owned(Key),
    /// A key defined elsewhere, known only by ARN
    Imported { key_arn: Token },
}

impl KeyRef {
    pub fn from_key_arn(key_arn: impl Into<Token>) -> Self {
        KeyRef::Imported {
            key_arn: key_arn.into(),
        }
    }

    pub fn key_arn(&self) -> Token {
        match self {
            KeyRef::Owned(key) => key.key_arn(),
            KeyRef::Imported { key_arn } => key_arn.clone(),
        }
    }

    /// Grant `actions` on the key, but only for requests made through `service`.
    ///
    /// Owned keys receive one key-policy statement naming the grantee. Imported
    /// keys cannot be edited, so the statement goes to the grantee's identity
    /// policy instead, scoped to the key ARN.
    pub fn grant_via_service(
        &self,
        stack: &mut Stack,
        grantee: &dyn Grantable,
        actions: &[&str],
        service: Token,
    ) -> Result<Grant> {
        let statement = PolicyStatement::new()
            .with_actions(actions.iter().copied())
            .with_condition("StringEquals", "kms:ViaService", service);

        match self {
            KeyRef::Owned(key) => {
                let statement = statement
                    .with_principal(grantee.grant_principal())
                    .with_resources(["*"]);
                key.add_to_resource_policy(stack, statement.clone())?;
                debug!("Granted {:?} on key {}", actions, key.logical_id());
                Ok(Grant {
                    principal_statement: None,
                    resource_statement: Some(statement),
                })
            }
            KeyRef::Imported { key_arn } => {
                let grant = Grant::add_to_principal(
                    stack,
                    grantee,
                    statement.with_resources([key_arn.clone()]),
                )?;
                if !grant.success() {
                    warn!(
                        "Imported key {} cannot be granted to {}",
                        key_arn,
                        grantee.grant_principal()
                    );
                }
                Ok(grant)
            }
        }
    }
}

impl From<Key> for KeyRef {
    fn from(key: Key) -> Self {
        KeyRef::Owned(key)
    }
}

impl From<&Key> for KeyRef {
    fn from(key: &Key) -> Self {
        KeyRef::Owned(key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::{Role, RoleProps};

    fn via_secrets_manager() -> Token {
        Token::concat([
            Token::literal("secretsmanager."),
            Token::pseudo(tessera_core::Pseudo::Region),
            Token::literal(".amazonaws.com"),
        ])
    }

    #[test]
    fn test_key_defaults() {
        let mut stack = Stack::named("test");
        let key = Key::new(&mut stack, "Key", KeyProps::default()).unwrap();
        let template = stack.synth().unwrap();

        let resource = template.resource(key.logical_id().as_str()).unwrap();
        assert_eq!(resource["Type"], json!("AWS::KMS::Key"));
        assert_eq!(resource["DeletionPolicy"], json!("Retain"));
        assert_eq!(resource["Properties"]["EnableKeyRotation"], json!(false));
        assert_eq!(
            resource["Properties"]["KeyPolicy"]["Statement"][0]["Action"],
            json!("kms:*")
        );
    }

    #[test]
    fn test_owned_key_grant_lands_in_key_policy() {
        let mut stack = Stack::named("test");
        let key = Key::new(&mut stack, "Key", KeyProps::default()).unwrap();
        let role = Role::new(
            &mut stack,
            "Role",
            RoleProps::assumed_by(PolicyPrincipal::service("lambda.amazonaws.com")),
        )
        .unwrap();

        let key_ref = KeyRef::from(&key);
        let grant = key_ref
            .grant_via_service(&mut stack, &role, &["kms:Decrypt"], via_secrets_manager())
            .unwrap();
        assert!(grant.resource_statement.is_some());
        assert!(role.default_policy(&stack).is_none());

        let template = stack.synth().unwrap();
        let statement = &template.resource(key.logical_id().as_str()).unwrap()["Properties"]
            ["KeyPolicy"]["Statement"][1];
        assert_eq!(statement["Action"], json!("kms:Decrypt"));
        assert_eq!(
            statement["Principal"],
            json!({ "AWS": { "Fn::GetAtt": [role.logical_id().as_str(), "Arn"] } })
        );
        assert_eq!(
            statement["Condition"]["StringEquals"]["kms:ViaService"],
            json!({ "Fn::Join": ["", ["secretsmanager.", { "Ref": "AWS::Region" }, ".amazonaws.com"]] })
        );
    }

    #[test]
    fn test_imported_key_grant_lands_in_identity_policy() {
        let mut stack = Stack::named("test");
        let role = Role::new(
            &mut stack,
            "Role",
            RoleProps::assumed_by(PolicyPrincipal::service("lambda.amazonaws.com")),
        )
        .unwrap();
        let key_arn = "arn:aws:kms:us-east-1:111122223333:key/1234abcd";
        let key_ref = KeyRef::from_key_arn(key_arn);

        let grant = key_ref
            .grant_via_service(&mut stack, &role, &["kms:Decrypt"], via_secrets_manager())
            .unwrap();
        let statement = grant.principal_statement.unwrap();
        assert_eq!(statement.resources(), &[Token::literal(key_arn)]);
        assert!(role.default_policy(&stack).is_some());
    }
}
